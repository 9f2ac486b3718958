//! Loading and querying the bundle manifest.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{BundleEntry, BundleManifest, CdnEntry};

/// Load a bundle manifest from disk.
pub fn load_manifest(path: &Path) -> Result<BundleManifest> {
  let content = fs::read_to_string(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  let manifest: BundleManifest = serde_json::from_str(&content).map_err(|source| Error::Parse {
    path: path.to_path_buf(),
    source,
  })?;
  debug!(path = %path.display(), bundles = manifest.len(), "loaded bundle manifest");
  Ok(manifest)
}

/// Look up a bundle by name.
pub fn find_bundle<'a>(manifest: &'a BundleManifest, bundle_name: &str) -> Result<&'a BundleEntry> {
  manifest.get(bundle_name).ok_or_else(|| Error::BundleNotFound {
    name: bundle_name.to_string(),
  })
}

/// Development-mode file list of a bundle, relative to the application root.
///
/// CDN entries contribute their `development` file. Entries without one fall back to the
/// local production copy below `directory`.
pub fn debug_files(entry: &BundleEntry, directory: &str) -> Vec<String> {
  match entry {
    BundleEntry::Files(files) => files.clone(),
    BundleEntry::Cdn(entries) => entries
      .iter()
      .map(|cdn| debug_file_for_cdn(cdn, directory))
      .collect(),
  }
}

fn debug_file_for_cdn(entry: &CdnEntry, directory: &str) -> String {
  match &entry.development {
    Some(development) if !development.trim().is_empty() => development.clone(),
    _ => format!("{directory}{}", entry.production),
  }
}
