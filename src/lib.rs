#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod bundle;
pub mod checker;
pub mod checksum;
pub mod config;
pub mod error;
pub mod models;
pub mod template;

pub use asset_paths::{FnResolver, PathResolver, StaticRootResolver};
pub use builder::IncludeBuilder;
pub use checker::BundleIssue;
pub use config::{Config, FileTypeConfig};
pub use error::{Error, Result};
pub use models::{AssetKind, BundleEntry, BundleManifest, CdnEntry};
