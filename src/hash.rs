// src/hash.rs

//! SHA-512 hashing for source archive integrity
//!
//! Catalogs publish the lowercase hex SHA-512 of each archive. Comparison
//! is plain string equality: an uppercase digest in the catalog never
//! matches. This is an integrity check against corrupted or swapped
//! downloads, not authentication of the publisher.

use crate::error::{Error, Result};
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Compute the SHA-512 of everything a reader yields, as lowercase hex
pub fn hash_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Sha512::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// SHA-512 of a byte slice, as lowercase hex
pub fn sha512(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

/// Stream a file through SHA-512
pub fn sha512_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .map_err(|e| Error::IoError(format!("Failed to open {}: {e}", path.display())))?;
    hash_reader(&mut file)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {e}", path.display())))
}

/// Whether a file's SHA-512 equals `expected` exactly
pub fn verify_file_sha512(path: &Path, expected: &str) -> Result<bool> {
    let actual = sha512_file(path)?;
    debug!("SHA-512 of {}: {}", path.display(), actual);
    Ok(actual == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HELLO_SHA512: &str = "309ecc489c12d6eb4cc40f50c902f2b4d0ed77ee511a7c7a9bcd3ca86d4cd86f989dd35bc5ff499670da34255b45b0cfd830e81f605dcf7dc5542e93ae9cd76f";

    #[test]
    fn test_sha512_known_value() {
        assert_eq!(sha512(b"hello world"), HELLO_SHA512);
        assert_eq!(hash_reader(&mut &b"hello world"[..]).unwrap(), HELLO_SHA512);
    }

    #[test]
    fn test_verify_file_exact_match() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        assert!(verify_file_sha512(file.path(), HELLO_SHA512).unwrap());
    }

    #[test]
    fn test_verify_file_is_case_sensitive() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();

        let upper = HELLO_SHA512.to_uppercase();
        assert!(!verify_file_sha512(file.path(), &upper).unwrap());
    }

    #[test]
    fn test_verify_file_single_flipped_byte() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello worle").unwrap();

        assert!(!verify_file_sha512(file.path(), HELLO_SHA512).unwrap());
    }

    #[test]
    fn test_verify_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = verify_file_sha512(&dir.path().join("missing.tar.gz"), HELLO_SHA512);
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_large_input_streams() {
        let data = vec![0x5au8; 100_000];
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();

        let expected = sha512(&data);
        assert!(verify_file_sha512(file.path(), &expected).unwrap());
    }
}
