//! Checksum calculation for persisted availability content.
//!
//! The autosave pipeline hashes the content of a pending write and compares
//! it against the last persisted snapshot; identical content is skipped
//! rather than rewritten.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of persisted content.
///
/// # Arguments
/// * `content` - canonical string form of the record content
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}
