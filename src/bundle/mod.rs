//! Helpers for reading the bundle manifest and rendering CDN includes.

pub mod cdn;
pub mod manifest;

pub use cdn::CachebusterSource;
pub use manifest::{debug_files, find_bundle, load_manifest};
