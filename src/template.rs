//! Single-pass `{NAME}` placeholder substitution for HTML templates.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

fn placeholder_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("invalid placeholder regex")
  })
}

/// The `{name}` placeholder exactly as written, for templates that pass unknown names through.
pub fn verbatim(name: &str) -> String {
  format!("{{{name}}}")
}

/// Replace every placeholder in `template` with the value returned by `resolve`.
///
/// The template is scanned once from left to right, so substituted values are never
/// scanned again. `resolve` is only called for placeholders that occur in the template.
/// Returning `Ok(None)` marks the placeholder as unknown and fails the render.
pub fn render<F>(template: &str, mut resolve: F) -> Result<String>
where
  F: FnMut(&str) -> Result<Option<String>>,
{
  let mut output = String::with_capacity(template.len());
  let mut last = 0;

  for caps in placeholder_pattern().captures_iter(template) {
    let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
      continue;
    };
    let value = resolve(name.as_str())?.ok_or_else(|| Error::Template {
      placeholder: name.as_str().to_string(),
      template: template.to_string(),
    })?;
    output.push_str(&template[last..whole.start()]);
    output.push_str(&value);
    last = whole.end();
  }

  output.push_str(&template[last..]);
  Ok(output)
}
