use std::path::PathBuf;

/// Prefix marking a path as relative to the application root.
pub const VIRTUAL_ROOT: &str = "~/";

/// Maps application-relative virtual paths to public URLs and physical files.
///
/// Both operations must be deterministic for a given input. Paths passed in always start
/// with [`VIRTUAL_ROOT`].
pub trait PathResolver {
  /// URL the browser should use to fetch the file.
  fn to_public_url(&self, virtual_path: &str) -> String;
  /// Location of the file on the local file system.
  fn to_physical_path(&self, virtual_path: &str) -> PathBuf;
}

impl<R: PathResolver + ?Sized> PathResolver for &R {
  fn to_public_url(&self, virtual_path: &str) -> String {
    (**self).to_public_url(virtual_path)
  }

  fn to_physical_path(&self, virtual_path: &str) -> PathBuf {
    (**self).to_physical_path(virtual_path)
  }
}

/// Resolver built from a pair of closures supplied by the hosting web framework.
#[derive(Clone)]
pub struct FnResolver<U, P> {
  public_url: U,
  physical_path: P,
}

impl<U, P> FnResolver<U, P>
where
  U: Fn(&str) -> String,
  P: Fn(&str) -> PathBuf,
{
  /// Wrap the URL mapping and the physical path mapping.
  pub fn new(public_url: U, physical_path: P) -> Self {
    Self {
      public_url,
      physical_path,
    }
  }
}

impl<U, P> PathResolver for FnResolver<U, P>
where
  U: Fn(&str) -> String,
  P: Fn(&str) -> PathBuf,
{
  fn to_public_url(&self, virtual_path: &str) -> String {
    (self.public_url)(virtual_path)
  }

  fn to_physical_path(&self, virtual_path: &str) -> PathBuf {
    (self.physical_path)(virtual_path)
  }
}

/// Resolver for sites served straight from a directory under a fixed URL prefix.
#[derive(Debug, Clone)]
pub struct StaticRootResolver {
  web_root: PathBuf,
  url_prefix: String,
}

impl StaticRootResolver {
  /// Serve files below `web_root` at URLs starting with `url_prefix`.
  pub fn new(web_root: impl Into<PathBuf>, url_prefix: &str) -> Self {
    let trimmed = url_prefix.trim_end_matches('/');
    Self {
      web_root: web_root.into(),
      url_prefix: format!("{trimmed}/"),
    }
  }
}

impl PathResolver for StaticRootResolver {
  fn to_public_url(&self, virtual_path: &str) -> String {
    format!("{}{}", self.url_prefix, strip_virtual_root(virtual_path))
  }

  fn to_physical_path(&self, virtual_path: &str) -> PathBuf {
    strip_virtual_root(virtual_path)
      .split('/')
      .filter(|segment| !segment.is_empty())
      .fold(self.web_root.clone(), |path, segment| path.join(segment))
  }
}

/// Turn a manifest path into a virtual path rooted at [`VIRTUAL_ROOT`].
///
/// Backslashes from Windows-authored manifests become forward slashes, and leading
/// slashes are dropped so that `/js/a.js` and `js/a.js` name the same file.
pub fn to_virtual_path(path: &str) -> String {
  let normalised = path.replace('\\', "/");
  if normalised.starts_with(VIRTUAL_ROOT) {
    return normalised;
  }
  format!("{VIRTUAL_ROOT}{}", normalised.trim_start_matches('/'))
}

fn strip_virtual_root(virtual_path: &str) -> &str {
  virtual_path
    .strip_prefix(VIRTUAL_ROOT)
    .unwrap_or(virtual_path)
    .trim_start_matches('/')
}
