//! Content hashing for render cache keys

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a payload
///
/// Used to fingerprint override values, so identical payloads always map to
/// the same cache entry and retrieval URL.
pub fn content_hash(payload: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_ref());
    hex::encode(hasher.finalize())
}

/// Whether two digests match, ignoring an optional `sha256:` prefix and case
pub fn digest_matches(expected: &str, actual: &str) -> bool {
    normalize(expected) == normalize(actual)
}

fn normalize(digest: &str) -> String {
    let digest = digest.trim().to_lowercase();
    digest
        .strip_prefix("sha256:")
        .or_else(|| digest.strip_prefix("sha256-"))
        .unwrap_or(&digest)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_known_value() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_content_hash_is_stable_and_distinct() {
        let a = content_hash("replicaCount: 2\n");
        assert_eq!(a, content_hash(b"replicaCount: 2\n".to_vec()));
        assert_ne!(a, content_hash("replicaCount: 3\n"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_digest_matches() {
        assert!(digest_matches("sha256:ABC123", "abc123"));
        assert!(digest_matches("sha256-abc123", "sha256:abc123"));
        assert!(!digest_matches("sha256:abc123", "xyz789"));
    }
}
