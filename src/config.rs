//! Configuration loader describing directories and HTML templates per asset kind.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::AssetKind;

/// File name of the optional configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "BundlerForBower.json";

/// Placeholder replaced by the public URL of the referenced file.
pub const FILE_URL_PARAM: &str = "FILE_URL";

/// Placeholder replaced by the content checksum of the referenced file.
pub const CACHEBUSTER_PARAM: &str = "CACHEBUSTER";

const DEFAULT_BUNDLES_FILE_NAME: &str = "BowerBundles.json";

/// Directory and templates used for one asset kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeConfig {
  /// Directory prefix of the production files, relative to the application root.
  pub directory: String,
  /// Template rendered once per source file in development mode.
  pub debug_html_format: String,
  /// Template rendered for the single minified file in production mode.
  pub non_debug_html_format: String,
  /// Template rendered for each CDN entry, when CDN delivery is supported.
  pub cdn_html_format: Option<String>,
}

impl FileTypeConfig {
  /// Built-in templates for the given kind.
  pub fn default_for(kind: AssetKind) -> Self {
    match kind {
      AssetKind::Style => Self {
        directory: "css/".into(),
        debug_html_format: "<link href='{FILE_URL}' rel='stylesheet'>".into(),
        non_debug_html_format: "<link href='{FILE_URL}?v={CACHEBUSTER}' rel='stylesheet'>".into(),
        cdn_html_format: Some(
          "<link href='{cdnUrl}' rel='stylesheet' integrity='{integrity}' crossorigin='anonymous'>"
            .into(),
        ),
      },
      AssetKind::Script => Self {
        directory: "js/".into(),
        debug_html_format: "<script src='{FILE_URL}'></script>".into(),
        non_debug_html_format: "<script src='{FILE_URL}?v={CACHEBUSTER}'></script>".into(),
        cdn_html_format: Some(
          "<script src='{cdnUrl}'></script><script>({cdnSuccessTest}||document.write(\"<script src='{FILE_URL}'><\\/script>\"));</script>"
            .into(),
        ),
      },
    }
  }

  fn overlay(mut self, partial: PartialFileTypeConfig) -> Self {
    if let Some(directory) = partial.directory {
      self.directory = directory;
    }
    if let Some(format) = partial.debug_html_format {
      self.debug_html_format = format;
    }
    if let Some(format) = partial.non_debug_html_format {
      self.non_debug_html_format = format;
    }
    if let Some(format) = partial.cdn_html_format {
      self.cdn_html_format = format.filter(|value| !value.is_empty());
    }
    self
  }
}

/// Effective configuration: the file on disk merged over the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Name of the bundle manifest inside the data directory.
  pub bundles_file_name: String,
  file_types: BTreeMap<AssetKind, FileTypeConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      bundles_file_name: DEFAULT_BUNDLES_FILE_NAME.into(),
      file_types: AssetKind::ALL
        .into_iter()
        .map(|kind| (kind, FileTypeConfig::default_for(kind)))
        .collect(),
    }
  }
}

impl Config {
  /// Load the configuration from the data directory, using defaults when the file is absent.
  pub fn discover(data_dir: &Path) -> Result<Self> {
    Self::load_from_path(data_dir.join(CONFIG_FILE_NAME))
  }

  /// Load a specific configuration file. A missing file yields the defaults.
  pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no configuration file, using defaults");
        return Ok(Self::default());
      }
      Err(err) => {
        return Err(Error::Io {
          path: path.to_path_buf(),
          source: err,
        });
      }
    };

    let file: ConfigFile = serde_json::from_str(&contents).map_err(|err| Error::Parse {
      path: path.to_path_buf(),
      source: err,
    })?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(Self::from(file))
  }

  /// Templates for the given kind, or a configuration error when the kind was disabled.
  pub fn file_type(&self, kind: AssetKind) -> Result<&FileTypeConfig> {
    self.file_types.get(&kind).ok_or_else(|| {
      Error::configuration(format!("the configuration has no settings for {kind} files"))
    })
  }
}

/// Raw JSON layout of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
  #[serde(default)]
  bundles_file_name: Option<String>,
  #[serde(default, deserialize_with = "present_or_null")]
  css: Option<Option<PartialFileTypeConfig>>,
  #[serde(default, deserialize_with = "present_or_null")]
  js: Option<Option<PartialFileTypeConfig>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialFileTypeConfig {
  directory: Option<String>,
  debug_html_format: Option<String>,
  non_debug_html_format: Option<String>,
  #[serde(default, deserialize_with = "present_or_null")]
  cdn_html_format: Option<Option<String>>,
}

/// Distinguish an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

impl From<ConfigFile> for Config {
  fn from(file: ConfigFile) -> Self {
    let mut config = Config::default();
    if let Some(name) = file.bundles_file_name.filter(|name| !name.trim().is_empty()) {
      config.bundles_file_name = name;
    }

    for (kind, section) in [(AssetKind::Style, file.css), (AssetKind::Script, file.js)] {
      match section {
        None => {}
        Some(None) => {
          config.file_types.remove(&kind);
        }
        Some(Some(partial)) => {
          let merged = FileTypeConfig::default_for(kind).overlay(partial);
          config.file_types.insert(kind, merged);
        }
      }
    }
    config
  }
}
