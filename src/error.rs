//! Error type shared by every include-generation step.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort include generation. No partial output is ever returned.
#[derive(Debug, Error)]
pub enum Error {
  /// The configuration cannot serve the request (missing asset kind or CDN template).
  #[error("configuration error: {message}")]
  Configuration {
    /// Human readable description of the mismatch.
    message: String,
  },

  /// The requested bundle is not declared in the manifest.
  #[error("bundle '{name}' was not found in the bundle manifest")]
  BundleNotFound {
    /// Name of the missing bundle.
    name: String,
  },

  /// The cache buster could not be computed because the file was unreadable.
  #[error("failed to compute checksum of {}: {source}", .path.display())]
  Checksum {
    /// Physical path of the file being hashed.
    path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    source: std::io::Error,
  },

  /// Reading a configuration file, manifest or directory failed.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    source: std::io::Error,
  },

  /// A configuration file or manifest is not valid JSON for its schema.
  #[error("failed to parse {}: {source}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },

  /// A template references a placeholder that nothing can fill.
  #[error("unknown placeholder {{{placeholder}}} in template '{template}'")]
  Template {
    /// Placeholder name without braces.
    placeholder: String,
    /// Template that contained it.
    template: String,
  },

  /// A wildcard debug path matched no files.
  #[error("no files match '{pattern}'")]
  NoMatchingFiles {
    /// The virtual path pattern as written in the manifest.
    pattern: String,
  },
}

impl Error {
  pub(crate) fn configuration(message: impl Into<String>) -> Self {
    Self::Configuration {
      message: message.into(),
    }
  }
}
