use sha2::{Digest, Sha256};

/// Identity hash for the token endpoint: hex SHA-256 of `app_id:secret_key`.
pub fn app_id_hash(app_id: &str, secret_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(app_id.as_bytes());
    hasher.update(b":");
    hasher.update(secret_key.as_bytes());
    format!("{:x}", hasher.finalize())
}
