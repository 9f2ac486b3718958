//! Consistency checks between debug sources and the production files that replace them.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::asset_paths::{PathResolver, expand_wildcards, has_wildcard, to_virtual_path};
use crate::builder::{IncludeBuilder, minified_path, production_copy_path};
use crate::error::{Error, Result};
use crate::models::{AssetKind, BundleEntry};

/// A problem that would make production output differ from development output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleIssue {
  /// The production file does not exist.
  MissingProduction {
    /// Bundle the file belongs to.
    bundle: String,
    /// Kind of the production file.
    kind: AssetKind,
    /// Physical path that was expected.
    path: PathBuf,
  },
  /// A debug source was modified after the production file was written.
  StaleProduction {
    /// Bundle the file belongs to.
    bundle: String,
    /// Kind of the production file.
    kind: AssetKind,
    /// Physical path of the production file.
    path: PathBuf,
    /// Physical path of the newer source.
    newer_source: PathBuf,
  },
  /// A debug source listed in the manifest cannot be found.
  MissingSource {
    /// Bundle the file belongs to.
    bundle: String,
    /// Virtual path or pattern as resolved from the manifest.
    source: String,
  },
}

impl fmt::Display for BundleIssue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingProduction { bundle, kind, path } => {
        write!(f, "{bundle} ({kind}): production file {} is missing", path.display())
      }
      Self::StaleProduction {
        bundle,
        kind,
        path,
        newer_source,
      } => write!(
        f,
        "{bundle} ({kind}): {} is older than {}",
        path.display(),
        newer_source.display()
      ),
      Self::MissingSource { bundle, source } => {
        write!(f, "{bundle}: source {source} was not found")
      }
    }
  }
}

impl<R: PathResolver> IncludeBuilder<R> {
  /// Check every bundle in the manifest against its production files.
  ///
  /// Kinds are inferred from file extensions. Kinds without configuration are skipped.
  pub fn check_bundles(&self) -> Result<Vec<BundleIssue>> {
    let (config, manifest) = self.load_sources()?;
    let mut issues = Vec::new();

    for (name, bundle) in &manifest {
      for kind in bundle_kinds(bundle) {
        let Ok(file_type) = config.file_type(kind) else {
          continue;
        };
        match bundle {
          BundleEntry::Files(files) => {
            let mut sources = Vec::new();
            let mut unresolved = false;
            for file in files
              .iter()
              .filter(|file| AssetKind::from_path(file) == Some(kind))
            {
              let virtual_path = to_virtual_path(file);
              match expand_wildcards(self.resolver(), &virtual_path) {
                Ok(paths) => sources.extend(paths),
                Err(err) if is_missing_pattern(&err, &virtual_path) => {
                  issues.push(BundleIssue::MissingSource {
                    bundle: name.clone(),
                    source: virtual_path,
                  });
                  unresolved = true;
                }
                Err(err) => return Err(err),
              }
            }
            if unresolved {
              continue;
            }
            let production = minified_path(file_type, name, kind);
            self.check_production(name, kind, &production, &sources, &mut issues);
          }
          BundleEntry::Cdn(entries) => {
            for entry in entries
              .iter()
              .filter(|entry| AssetKind::from_path(&entry.production) == Some(kind))
            {
              let production = production_copy_path(file_type, &entry.production);
              let sources: Vec<String> = entry
                .development
                .iter()
                .map(|development| to_virtual_path(development))
                .collect();
              self.check_production(name, kind, &production, &sources, &mut issues);
            }
          }
        }
      }
    }

    debug!(bundles = manifest.len(), issues = issues.len(), "checked bundles");
    Ok(issues)
  }

  fn check_production(
    &self,
    bundle: &str,
    kind: AssetKind,
    production: &str,
    sources: &[String],
    issues: &mut Vec<BundleIssue>,
  ) {
    let production_path = self.resolver().to_physical_path(production);
    let Some(production_time) = modified(&production_path) else {
      issues.push(BundleIssue::MissingProduction {
        bundle: bundle.to_string(),
        kind,
        path: production_path,
      });
      return;
    };

    for source in sources {
      let source_path = self.resolver().to_physical_path(source);
      match modified(&source_path) {
        None => issues.push(BundleIssue::MissingSource {
          bundle: bundle.to_string(),
          source: source.clone(),
        }),
        Some(source_time) if source_time > production_time => {
          issues.push(BundleIssue::StaleProduction {
            bundle: bundle.to_string(),
            kind,
            path: production_path.clone(),
            newer_source: source_path,
          });
        }
        Some(_) => {}
      }
    }
  }
}

fn bundle_kinds(bundle: &BundleEntry) -> BTreeSet<AssetKind> {
  match bundle {
    BundleEntry::Files(files) => files
      .iter()
      .filter_map(|file| AssetKind::from_path(file))
      .collect(),
    BundleEntry::Cdn(entries) => entries
      .iter()
      .filter_map(|entry| AssetKind::from_path(&entry.production))
      .collect(),
  }
}

/// A wildcard with no matches, or whose directory does not exist.
fn is_missing_pattern(err: &Error, virtual_path: &str) -> bool {
  match err {
    Error::NoMatchingFiles { .. } => true,
    Error::Io { source, .. } => {
      has_wildcard(virtual_path) && source.kind() == std::io::ErrorKind::NotFound
    }
    _ => false,
  }
}

fn modified(path: &Path) -> Option<SystemTime> {
  fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
