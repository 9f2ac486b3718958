//! Helpers for turning manifest paths into virtual paths, public URLs and files on disk.
//!
//! Resolution is delegated to a [`PathResolver`] supplied by the host so that the same
//! include logic works behind any web framework's URL and file mapping.

mod resolver;
mod search;

pub use resolver::{FnResolver, PathResolver, StaticRootResolver, VIRTUAL_ROOT, to_virtual_path};
pub use search::{expand_wildcards, has_wildcard};
