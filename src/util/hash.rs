//! Hashing utilities for archive RECORD digests.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// The digest of a file as recorded in an archive's RECORD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// URL-safe base64 SHA-256 digest without padding
    pub digest: String,

    /// Size of the file in bytes
    pub size: u64,
}

/// Compute the RECORD digest of a byte slice.
pub fn record_digest_bytes(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(data))
}

/// Compute the RECORD digest and size of a file.
pub fn record_digest_file(path: &Path) -> Result<FileDigest> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    let mut size = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        size += bytes_read as u64;
    }

    Ok(FileDigest {
        digest: URL_SAFE_NO_PAD.encode(hasher.finalize()),
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_digest_bytes() {
        // sha256("hello") encoded as url-safe base64 with the padding removed.
        assert_eq!(
            record_digest_bytes(b"hello"),
            "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ"
        );
    }

    #[test]
    fn test_record_digest_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.txt");
        std::fs::write(&path, "hello").unwrap();

        let digest = record_digest_file(&path).unwrap();
        assert_eq!(digest.digest, record_digest_bytes(b"hello"));
        assert_eq!(digest.size, 5);
    }
}
