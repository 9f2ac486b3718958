//! Data structures read from the bundle manifest.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a bundle is delivered as stylesheets or scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum AssetKind {
  /// CSS delivered through `<link>` tags.
  #[serde(rename = "css")]
  Style,
  /// JavaScript delivered through `<script>` tags.
  #[serde(rename = "js")]
  Script,
}

impl AssetKind {
  /// Every supported kind, in configuration order.
  pub const ALL: [AssetKind; 2] = [AssetKind::Style, AssetKind::Script];

  /// Lower-case file extension of the minified file, without the dot.
  pub fn extension(self) -> &'static str {
    match self {
      AssetKind::Style => "css",
      AssetKind::Script => "js",
    }
  }

  /// Infer the kind from a file path's extension.
  pub fn from_path(path: &str) -> Option<Self> {
    let (_, extension) = path.rsplit_once('.')?;
    Self::ALL
      .into_iter()
      .find(|kind| extension.eq_ignore_ascii_case(kind.extension()))
  }
}

impl fmt::Display for AssetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.extension())
  }
}

impl FromStr for AssetKind {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.to_ascii_lowercase().as_str() {
      "css" | "style" => Ok(AssetKind::Style),
      "js" | "script" => Ok(AssetKind::Script),
      other => Err(format!("unknown asset kind '{other}', expected css or js")),
    }
  }
}

/// A file served from a content delivery network with a local production copy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CdnEntry {
  /// File name of the local copy, relative to the kind's directory.
  pub production: String,
  /// Source file used in development mode.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub development: Option<String>,
  /// Provider specific fields such as `cdnUrl`, `cdnSuccessTest` or `integrity`.
  #[serde(flatten)]
  pub fields: BTreeMap<String, Value>,
}

impl CdnEntry {
  /// Text substituted for a `{name}` placeholder taken from this entry.
  ///
  /// Strings are returned verbatim and numbers or booleans in their JSON form. Nested values
  /// and nulls have no textual form.
  pub fn field(&self, name: &str) -> Option<String> {
    match name {
      "production" => return Some(self.production.clone()),
      "development" => return self.development.clone(),
      _ => {}
    }
    match self.fields.get(name)? {
      Value::String(text) => Some(text.clone()),
      value @ (Value::Number(_) | Value::Bool(_)) => Some(value.to_string()),
      Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
  }
}

/// Contents of a single named bundle.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BundleEntry {
  /// Debug source files, relative to the application root.
  Files(Vec<String>),
  /// CDN hosted files with local fallbacks.
  Cdn(Vec<CdnEntry>),
}

impl BundleEntry {
  /// CDN descriptors, empty for plain file bundles.
  pub fn cdn_entries(&self) -> &[CdnEntry] {
    match self {
      BundleEntry::Files(_) => &[],
      BundleEntry::Cdn(entries) => entries,
    }
  }
}

/// Deserialised bundle manifest keyed by bundle name.
pub type BundleManifest = BTreeMap<String, BundleEntry>;
