//! Wildcard expansion of debug file paths against the physical directory.

use std::fs;

use regex::Regex;
use tracing::trace;

use super::resolver::PathResolver;
use crate::error::{Error, Result};

/// Returns `true` when the file-name segment of `path` contains a wildcard.
pub fn has_wildcard(path: &str) -> bool {
  let (_, file_name) = split_file_name(path);
  file_name.contains(['*', '?'])
}

/// Expand a virtual path whose file-name segment contains `*` or `?` wildcards.
///
/// The parent directory is listed through the resolver's physical mapping and every file
/// whose name matches is returned as a virtual path, sorted by name. Paths without
/// wildcards are returned unchanged and the file system is not touched.
pub fn expand_wildcards<R: PathResolver + ?Sized>(
  resolver: &R,
  virtual_path: &str,
) -> Result<Vec<String>> {
  if !has_wildcard(virtual_path) {
    return Ok(vec![virtual_path.to_string()]);
  }

  let (directory, pattern) = split_file_name(virtual_path);
  let matcher = glob_to_regex(pattern);
  let physical_dir = resolver.to_physical_path(directory);

  let entries = fs::read_dir(&physical_dir).map_err(|source| Error::Io {
    path: physical_dir.clone(),
    source,
  })?;

  let mut names = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|source| Error::Io {
      path: physical_dir.clone(),
      source,
    })?;
    if !fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file()) {
      continue;
    }
    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      continue;
    };
    if matcher.is_match(name) {
      names.push(name.to_string());
    }
  }

  if names.is_empty() {
    return Err(Error::NoMatchingFiles {
      pattern: virtual_path.to_string(),
    });
  }

  names.sort();
  trace!(pattern = virtual_path, matches = names.len(), "expanded wildcard");
  Ok(
    names
      .into_iter()
      .map(|name| format!("{directory}{name}"))
      .collect(),
  )
}

/// Split into the directory part (including its trailing slash) and the file name.
fn split_file_name(path: &str) -> (&str, &str) {
  match path.rfind('/') {
    Some(index) => path.split_at(index + 1),
    None => ("", path),
  }
}

fn glob_to_regex(pattern: &str) -> Regex {
  let mut expression = String::from("^");
  for ch in pattern.chars() {
    match ch {
      '*' => expression.push_str(".*"),
      '?' => expression.push('.'),
      other => expression.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
    }
  }
  expression.push('$');
  Regex::new(&expression).expect("escaped glob is always a valid regex")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::asset_paths::StaticRootResolver;
  use tempfile::tempdir;

  #[test]
  fn leaves_plain_paths_untouched() {
    let resolver = StaticRootResolver::new("/does/not/exist", "/");
    let expanded = expand_wildcards(&resolver, "~/js/site.js").unwrap();
    assert_eq!(expanded, vec!["~/js/site.js".to_string()]);
  }

  #[test]
  fn expands_matching_files_in_name_order() {
    let temp = tempdir().unwrap();
    let js_dir = temp.path().join("js");
    fs::create_dir_all(js_dir.join("nested.js")).unwrap();
    for name in ["b.js", "a.js", "notes.txt", "c.min.js"] {
      fs::write(js_dir.join(name), name).unwrap();
    }
    let resolver = StaticRootResolver::new(temp.path(), "/");

    let expanded = expand_wildcards(&resolver, "~/js/*.js").unwrap();
    assert_eq!(expanded, vec!["~/js/a.js", "~/js/b.js", "~/js/c.min.js"]);

    let single = expand_wildcards(&resolver, "~/js/?.js").unwrap();
    assert_eq!(single, vec!["~/js/a.js", "~/js/b.js"]);
  }

  #[test]
  fn treats_regex_characters_literally() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("a+b.js"), "").unwrap();
    fs::write(temp.path().join("aab.js"), "").unwrap();
    let resolver = StaticRootResolver::new(temp.path(), "/");

    let expanded = expand_wildcards(&resolver, "~/a+*.js").unwrap();
    assert_eq!(expanded, vec!["~/a+b.js"]);
  }

  #[test]
  fn reports_patterns_without_matches() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("site.css"), "").unwrap();
    let resolver = StaticRootResolver::new(temp.path(), "/");

    let err = expand_wildcards(&resolver, "~/*.js").unwrap_err();
    assert!(matches!(err, Error::NoMatchingFiles { ref pattern } if pattern == "~/*.js"));
  }

  #[test]
  fn reports_missing_directories() {
    let temp = tempdir().unwrap();
    let resolver = StaticRootResolver::new(temp.path(), "/");

    let err = expand_wildcards(&resolver, "~/missing/*.js").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }

  #[cfg(unix)]
  #[test]
  fn follows_symlinked_files() {
    let temp = tempdir().unwrap();
    let vendor = temp.path().join("vendor");
    let js_dir = temp.path().join("js");
    fs::create_dir_all(&vendor).unwrap();
    fs::create_dir_all(&js_dir).unwrap();
    fs::write(vendor.join("lib.js"), "").unwrap();
    std::os::unix::fs::symlink(vendor.join("lib.js"), js_dir.join("lib.js")).unwrap();
    std::os::unix::fs::symlink(&vendor, js_dir.join("vendor.js")).unwrap();
    let resolver = StaticRootResolver::new(temp.path(), "/");

    let expanded = expand_wildcards(&resolver, "~/js/*.js").unwrap();
    assert_eq!(expanded, vec!["~/js/lib.js"]);
  }
}
