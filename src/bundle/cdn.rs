//! Rendering of include tags from templates, including CDN entries with local fallbacks.

use crate::config::{CACHEBUSTER_PARAM, FILE_URL_PARAM};
use crate::error::Result;
use crate::models::CdnEntry;
use crate::template;

/// Lazily computed cache buster, evaluated at most once.
pub struct CachebusterSource<F> {
  compute: Option<F>,
  value: Option<String>,
}

impl<F> CachebusterSource<F>
where
  F: FnOnce() -> Result<String>,
{
  /// Defer `compute` until a template asks for `{CACHEBUSTER}`.
  pub fn new(compute: F) -> Self {
    Self {
      compute: Some(compute),
      value: None,
    }
  }

  /// Returns `true` once the checksum has been computed.
  pub fn is_computed(&self) -> bool {
    self.value.is_some()
  }

  fn get(&mut self) -> Result<String> {
    if let Some(compute) = self.compute.take() {
      self.value = Some(compute()?);
    }
    Ok(self.value.clone().unwrap_or_default())
  }
}

/// Render `template` with `{FILE_URL}`, `{CACHEBUSTER}` and any placeholder `fields` knows.
pub fn render_include<F, L>(
  template_text: &str,
  file_url: &str,
  cachebuster: &mut CachebusterSource<F>,
  fields: L,
) -> Result<String>
where
  F: FnOnce() -> Result<String>,
  L: Fn(&str) -> Option<String>,
{
  template::render(template_text, |name| match name {
    FILE_URL_PARAM => Ok(Some(file_url.to_string())),
    CACHEBUSTER_PARAM => cachebuster.get().map(Some),
    other => Ok(fields(other)),
  })
}

impl CdnEntry {
  /// Build the include for this entry from the configured CDN template.
  ///
  /// `file_url` is the public URL of the local production copy. `checksum` is only called
  /// when the template contains `{CACHEBUSTER}`.
  pub fn build_include<F>(&self, cdn_template: &str, file_url: &str, checksum: F) -> Result<String>
  where
    F: FnOnce() -> Result<String>,
  {
    let mut cachebuster = CachebusterSource::new(checksum);
    render_include(cdn_template, file_url, &mut cachebuster, |name| self.field(name))
  }
}
