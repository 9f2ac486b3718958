//! Include generator producing the HTML tags for a bundle in development or production mode.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::asset_paths::{PathResolver, expand_wildcards, to_virtual_path};
use crate::bundle::cdn::{CachebusterSource, render_include};
use crate::bundle::{debug_files, find_bundle, load_manifest};
use crate::checksum::file_checksum;
use crate::config::{Config, FILE_URL_PARAM, FileTypeConfig};
use crate::error::{Error, Result};
use crate::models::{AssetKind, BundleEntry, BundleManifest, CdnEntry};
use crate::template;

/// Renders `<link>`/`<script>` includes from the bundle manifest in a data directory.
///
/// The configuration and manifest are read again on every call, so edits on disk are
/// picked up without restarting the host.
pub struct IncludeBuilder<R> {
  resolver: R,
  data_dir: PathBuf,
}

impl<R: PathResolver> IncludeBuilder<R> {
  /// Create a builder reading `BundlerForBower.json` and the bundle manifest from `data_dir`.
  pub fn new(resolver: R, data_dir: impl Into<PathBuf>) -> Self {
    Self {
      resolver,
      data_dir: data_dir.into(),
    }
  }

  /// Resolver used for public URLs and physical paths.
  pub fn resolver(&self) -> &R {
    &self.resolver
  }

  /// Produce the HTML needed to load `bundle_name` as `kind`.
  ///
  /// Development mode renders one debug tag per source file in manifest order. Production
  /// mode renders one tag per CDN entry, or a single tag for `<directory><bundle>.min.<ext>`
  /// when the bundle has no CDN entries. Lines are joined with `\n`.
  pub fn calculate_html_includes(
    &self,
    bundle_name: &str,
    kind: AssetKind,
    in_development: bool,
  ) -> Result<String> {
    let (config, manifest) = self.load_sources()?;
    let file_type = config.file_type(kind)?;
    let bundle = find_bundle(&manifest, bundle_name)?;

    let html = if in_development {
      self.form_debug_includes(bundle, file_type)?
    } else if bundle.cdn_entries().is_empty() {
      self.form_single_minified_include(bundle_name, kind, file_type)?
    } else {
      self.form_cdn_includes(bundle.cdn_entries(), bundle_name, kind, file_type)?
    };

    debug!(bundle = bundle_name, %kind, in_development, "rendered includes");
    Ok(html)
  }

  pub(crate) fn load_sources(&self) -> Result<(Config, BundleManifest)> {
    let config = Config::discover(&self.data_dir)?;
    let manifest = load_manifest(&self.data_dir.join(&config.bundles_file_name))?;
    Ok((config, manifest))
  }

  /// Virtual paths of a bundle's development files with wildcards expanded.
  pub(crate) fn debug_virtual_paths(
    &self,
    bundle: &BundleEntry,
    file_type: &FileTypeConfig,
  ) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for relative in debug_files(bundle, &file_type.directory) {
      paths.extend(expand_wildcards(&self.resolver, &to_virtual_path(&relative))?);
    }
    Ok(paths)
  }

  fn form_debug_includes(&self, bundle: &BundleEntry, file_type: &FileTypeConfig) -> Result<String> {
    let lines = self
      .debug_virtual_paths(bundle, file_type)?
      .iter()
      .map(|virtual_path| {
        let file_url = self.resolver.to_public_url(virtual_path);
        trace!(virtual_path = virtual_path.as_str(), file_url = file_url.as_str(), "debug file");
        template::render(&file_type.debug_html_format, |name| {
          Ok(Some(if name == FILE_URL_PARAM {
            file_url.clone()
          } else {
            template::verbatim(name)
          }))
        })
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
  }

  fn form_cdn_includes(
    &self,
    cdn_entries: &[CdnEntry],
    bundle_name: &str,
    kind: AssetKind,
    file_type: &FileTypeConfig,
  ) -> Result<String> {
    let Some(cdn_template) = file_type.cdn_html_format.as_deref() else {
      return Err(Error::configuration(format!(
        "the bundle {bundle_name} contains a cdn definition, but the current config does not support CDN for {kind}"
      )));
    };

    let lines = cdn_entries
      .iter()
      .map(|entry| {
        let virtual_path = production_copy_path(file_type, &entry.production);
        let file_url = self.resolver.to_public_url(&virtual_path);
        trace!(bundle = bundle_name, file_url = file_url.as_str(), "cdn entry");
        entry.build_include(cdn_template, &file_url, || self.checksum_of(&virtual_path))
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
  }

  fn form_single_minified_include(
    &self,
    bundle_name: &str,
    kind: AssetKind,
    file_type: &FileTypeConfig,
  ) -> Result<String> {
    let virtual_path = minified_path(file_type, bundle_name, kind);
    let file_url = self.resolver.to_public_url(&virtual_path);
    let mut cachebuster = CachebusterSource::new(|| self.checksum_of(&virtual_path));
    let html = render_include(
      &file_type.non_debug_html_format,
      &file_url,
      &mut cachebuster,
      |name| Some(template::verbatim(name)),
    )?;
    if cachebuster.is_computed() {
      trace!(bundle = bundle_name, "computed cache buster");
    }
    Ok(html)
  }

  fn checksum_of(&self, virtual_path: &str) -> Result<String> {
    file_checksum(&self.resolver.to_physical_path(virtual_path))
  }
}

/// Virtual path of the minified production file for a bundle.
pub(crate) fn minified_path(file_type: &FileTypeConfig, bundle_name: &str, kind: AssetKind) -> String {
  to_virtual_path(&format!(
    "{}{bundle_name}.min.{}",
    file_type.directory,
    kind.extension()
  ))
}

/// Virtual path of the local copy of a CDN hosted file.
pub(crate) fn production_copy_path(file_type: &FileTypeConfig, production: &str) -> String {
  to_virtual_path(&format!("{}{production}", file_type.directory))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::asset_paths::{FnResolver, StaticRootResolver};
  use crate::config::CONFIG_FILE_NAME;
  use std::fs;
  use tempfile::{TempDir, tempdir};

  const MANIFEST: &str = r#"{
    "site": ["js/a.js", "js/b.js"],
    "appCss": ["css/site.css", "css/theme.css"],
    "jquery": [
      {
        "development": "lib/jquery/dist/jquery.js",
        "production": "jquery.min.js",
        "cdnUrl": "https://code.jquery.com/jquery-2.2.0.min.js",
        "cdnSuccessTest": "window.jQuery"
      }
    ],
    "libs": ["lib/*.js"]
  }"#;

  fn fixture(config: Option<&str>) -> TempDir {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("BowerBundles.json"), MANIFEST).unwrap();
    if let Some(config) = config {
      fs::write(temp.path().join(CONFIG_FILE_NAME), config).unwrap();
    }
    temp
  }

  fn builder(temp: &TempDir) -> IncludeBuilder<StaticRootResolver> {
    IncludeBuilder::new(StaticRootResolver::new(temp.path(), "/static/"), temp.path())
  }

  #[test]
  fn renders_one_debug_line_per_file_in_manifest_order() {
    let temp = fixture(Some(
      r#"{"js": {"debugHtmlFormat": "<script src=\"{FILE_URL}\"></script>"}}"#,
    ));
    let resolver = FnResolver::new(
      |path: &str| format!("/static/{}", path.trim_start_matches("~/js/")),
      |path: &str| PathBuf::from(path),
    );
    let builder = IncludeBuilder::new(resolver, temp.path());

    let html = builder
      .calculate_html_includes("site", AssetKind::Script, true)
      .unwrap();
    assert_eq!(
      html,
      "<script src=\"/static/a.js\"></script>\n<script src=\"/static/b.js\"></script>"
    );
  }

  #[test]
  fn debug_mode_uses_development_file_of_cdn_entries() {
    let temp = fixture(None);
    let html = builder(&temp)
      .calculate_html_includes("jquery", AssetKind::Script, true)
      .unwrap();
    assert_eq!(html, "<script src='/static/lib/jquery/dist/jquery.js'></script>");
  }

  #[test]
  fn debug_mode_expands_wildcards() {
    let temp = fixture(None);
    fs::create_dir_all(temp.path().join("lib")).unwrap();
    fs::write(temp.path().join("lib/b.js"), "").unwrap();
    fs::write(temp.path().join("lib/a.js"), "").unwrap();

    let html = builder(&temp)
      .calculate_html_includes("libs", AssetKind::Script, true)
      .unwrap();
    assert_eq!(
      html,
      "<script src='/static/lib/a.js'></script>\n<script src='/static/lib/b.js'></script>"
    );
  }

  #[test]
  fn production_references_minified_file_with_cachebuster() {
    let temp = fixture(None);
    fs::create_dir_all(temp.path().join("css")).unwrap();
    fs::write(temp.path().join("css/appCss.min.css"), "body{}").unwrap();

    let html = builder(&temp)
      .calculate_html_includes("appCss", AssetKind::Style, false)
      .unwrap();
    let expected = format!(
      "<link href='/static/css/appCss.min.css?v={}' rel='stylesheet'>",
      crate::checksum::bytes_checksum(b"body{}")
    );
    assert_eq!(html, expected);
  }

  #[test]
  fn production_uses_js_extension_for_scripts() {
    let temp = fixture(Some(
      r#"{"js": {"nonDebugHtmlFormat": "<script src='{FILE_URL}'></script>"}}"#,
    ));
    let html = builder(&temp)
      .calculate_html_includes("site", AssetKind::Script, false)
      .unwrap();
    assert_eq!(html, "<script src='/static/js/site.min.js'></script>");
  }

  #[test]
  fn skips_checksum_without_cachebuster_placeholder() {
    let temp = fixture(Some(
      r#"{"css": {"nonDebugHtmlFormat": "<link href='{FILE_URL}'>"}}"#,
    ));
    let resolver = FnResolver::new(
      |path: &str| path.replace("~/", "/"),
      |_: &str| -> PathBuf { panic!("physical path must not be resolved") },
    );
    let builder = IncludeBuilder::new(resolver, temp.path());

    let html = builder
      .calculate_html_includes("appCss", AssetKind::Style, false)
      .unwrap();
    assert_eq!(html, "<link href='/css/appCss.min.css'>");
  }

  #[test]
  fn debug_mode_never_reads_files() {
    let temp = fixture(Some(
      r#"{"js": {"debugHtmlFormat": "<script src='{FILE_URL}?v={CACHEBUSTER}'></script>"}}"#,
    ));
    let resolver = FnResolver::new(
      |path: &str| path.replace("~/", "/"),
      |_: &str| -> PathBuf { panic!("physical path must not be resolved") },
    );
    let builder = IncludeBuilder::new(resolver, temp.path());

    let html = builder
      .calculate_html_includes("site", AssetKind::Script, true)
      .unwrap();
    assert_eq!(
      html,
      "<script src='/js/a.js?v={CACHEBUSTER}'></script>\n<script src='/js/b.js?v={CACHEBUSTER}'></script>"
    );
  }

  #[test]
  fn unknown_tokens_pass_through_debug_and_production_templates() {
    let temp = fixture(Some(
      r#"{"js": {
        "debugHtmlFormat": "<script src='{FILE_URL}' nonce='{NONCE}'></script>",
        "nonDebugHtmlFormat": "<script src='{FILE_URL}' nonce='{NONCE}'></script>"
      }}"#,
    ));
    let builder = builder(&temp);

    let production = builder
      .calculate_html_includes("site", AssetKind::Script, false)
      .unwrap();
    assert_eq!(production, "<script src='/static/js/site.min.js' nonce='{NONCE}'></script>");

    let development = builder
      .calculate_html_includes("site", AssetKind::Script, true)
      .unwrap();
    assert!(development.starts_with("<script src='/static/js/a.js' nonce='{NONCE}'></script>"));
  }

  #[test]
  fn missing_minified_file_is_a_checksum_error() {
    let temp = fixture(None);
    let err = builder(&temp)
      .calculate_html_includes("site", AssetKind::Script, false)
      .unwrap_err();
    match err {
      Error::Checksum { path, .. } => assert!(path.ends_with("js/site.min.js")),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn production_renders_cdn_entries() {
    let temp = fixture(None);
    let html = builder(&temp)
      .calculate_html_includes("jquery", AssetKind::Script, false)
      .unwrap();
    assert!(html.starts_with("<script src='https://code.jquery.com/jquery-2.2.0.min.js'></script>"));
    assert!(html.contains("window.jQuery||"));
    assert!(html.contains("<script src='/static/js/jquery.min.js'>"));
  }

  #[test]
  fn cdn_bundle_without_cdn_template_is_a_configuration_error() {
    let temp = fixture(Some(r#"{"js": {"cdnHtmlFormat": null}}"#));
    let err = builder(&temp)
      .calculate_html_includes("jquery", AssetKind::Script, false)
      .unwrap_err();
    match err {
      Error::Configuration { message } => {
        assert!(message.contains("jquery"));
        assert!(message.contains("js"));
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn unknown_bundle_fails_in_both_modes() {
    let temp = fixture(None);
    let builder = builder(&temp);
    for in_development in [true, false] {
      let err = builder
        .calculate_html_includes("missing", AssetKind::Style, in_development)
        .unwrap_err();
      assert!(matches!(err, Error::BundleNotFound { ref name } if name == "missing"));
    }
  }

  #[test]
  fn disabled_kind_is_a_configuration_error() {
    let temp = fixture(Some(r#"{"css": null}"#));
    let err = builder(&temp)
      .calculate_html_includes("appCss", AssetKind::Style, true)
      .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
  }

  #[test]
  fn reads_manifest_named_by_config() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join(CONFIG_FILE_NAME), r#"{"bundlesFileName": "bundles.json"}"#).unwrap();
    fs::write(temp.path().join("bundles.json"), r#"{"site": ["js/a.js"]}"#).unwrap();

    let html = builder(&temp)
      .calculate_html_includes("site", AssetKind::Script, true)
      .unwrap();
    assert_eq!(html, "<script src='/static/js/a.js'></script>");
  }
}
