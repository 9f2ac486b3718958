//! Content checksums used as cache busters.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Hash the full content of `path` into a string that is safe inside a URL query.
///
/// The digest is Base64 encoded with `-` and `_` in place of `+` and `/`, and without the
/// trailing `=` padding.
pub fn file_checksum(path: &Path) -> Result<String> {
  let to_error = |source| Error::Checksum {
    path: path.to_path_buf(),
    source,
  };

  let mut reader = BufReader::new(File::open(path).map_err(to_error)?);
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];
  loop {
    let read = reader.read(&mut buffer).map_err(to_error)?;
    if read == 0 {
      break;
    }
    hasher.update(&buffer[..read]);
  }

  let digest: [u8; 32] = hasher.finalize().into();
  Ok(encode_digest(&digest))
}

/// URL-safe checksum of an in-memory byte slice.
pub fn bytes_checksum(bytes: &[u8]) -> String {
  let digest: [u8; 32] = Sha256::digest(bytes).into();
  encode_digest(&digest)
}

/// Always 43 characters for a 32 byte digest.
fn encode_digest(digest: &[u8; 32]) -> String {
  general_purpose::URL_SAFE_NO_PAD.encode(digest)
}
