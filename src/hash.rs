//! SHA256 file hashing utilities

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Compute SHA256 hash of a file, streaming to avoid loading into memory
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read {:?}", path))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Whether two files hold identical bytes; sizes are compared before hashing
pub fn same_content(a: &Path, b: &Path) -> Result<bool> {
    let size_a = std::fs::metadata(a)
        .with_context(|| format!("Failed to stat {:?}", a))?
        .len();
    let size_b = std::fs::metadata(b)
        .with_context(|| format!("Failed to stat {:?}", b))?
        .len();
    if size_a != size_b {
        return Ok(false);
    }
    Ok(sha256_file(a)? == sha256_file(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sha256_known_content() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let hash = sha256_file(file.path()).unwrap();
        // SHA256 of "hello world"
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_same_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.cbz");
        let b = dir.path().join("b.cbz");
        let c = dir.path().join("c.cbz");
        std::fs::write(&a, b"page data").unwrap();
        std::fs::write(&b, b"page data").unwrap();
        std::fs::write(&c, b"page dat4").unwrap();

        assert!(same_content(&a, &b).unwrap());
        assert!(!same_content(&a, &c).unwrap());
        assert!(same_content(&a, &dir.path().join("missing.cbz")).is_err());
    }
}
