//! Hash-based change detection against the previous scan.
//!
//! The previous pass left a (relative path -> content hash) set in
//! storage. An unchanged hash yields `Same`, a differing hash `Changed`,
//! an unseen path `Added`. Paths from the previous set that are not
//! re-indexed form the removed set handled by the indexer.

use crate::core::FileStatus;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct StatusDetection {
    previous_hashes: HashMap<String, String>,
}

impl StatusDetection {
    pub fn new(previous_hashes: HashMap<String, String>) -> Self {
        Self { previous_hashes }
    }

    pub fn status(&self, relative_path: &str, hash: &str) -> FileStatus {
        match self.previous_hashes.get(relative_path) {
            Some(previous) if previous == hash => FileStatus::Same,
            Some(_) => FileStatus::Changed,
            None => FileStatus::Added,
        }
    }

    /// Paths recorded by the previous pass
    pub fn previous_paths(&self) -> impl Iterator<Item = &String> {
        self.previous_hashes.keys()
    }
}

/// SHA-256 digest of file content, hex encoded
pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        let hash = compute_hash(b"fn main() {}\n");
        let other = compute_hash(b"fn main() { println!(); }\n");
        let mut previous = HashMap::new();
        previous.insert("src/main.rs".to_string(), hash.clone());
        previous.insert("src/gone.rs".to_string(), other.clone());
        let detection = StatusDetection::new(previous);

        assert_eq!(detection.status("src/main.rs", &hash), FileStatus::Same);
        assert_eq!(detection.status("src/main.rs", &other), FileStatus::Changed);
        assert_eq!(detection.status("src/new.rs", &hash), FileStatus::Added);
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        assert_eq!(compute_hash(b"abc"), compute_hash(b"abc"));
        assert_ne!(compute_hash(b"abc"), compute_hash(b"abd"));
    }
}
