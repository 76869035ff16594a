//! Streamed SHA-256 digests
//!
//! Content is read in fixed-size chunks so arbitrarily large files are
//! digested in constant memory. Digests are lowercase hex without a prefix;
//! callers record the algorithm alongside the value.

use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Bytes read per chunk while digesting.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Algorithm name recorded next to every digest produced here.
pub const ALGORITHM: &str = "SHA256";

/// Compute the SHA-256 digest of an in-memory buffer.
pub fn sha256_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 digest of everything `reader` yields.
pub fn sha256_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the SHA-256 digest of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a read fails mid-stream.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    sha256_reader(file).map_err(|e| Error::io(path, e))
}
