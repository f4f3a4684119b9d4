//! Client ID derivation shared between the client registry and the
//! checkpoint namespace.

use sha2::{Digest, Sha256};

/// Derive a client id from a working directory: the first 12 hex
/// characters of SHA-256(cwd).
#[must_use]
pub fn derive_client_id(cwd: &str) -> String {
    let digest = Sha256::digest(cwd.as_bytes());
    hex::encode(digest)[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_stable_and_twelve_hex_chars() {
        let a = derive_client_id("/home/user/project");
        let b = derive_client_id("/home/user/project");
        let c = derive_client_id("/home/user/other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
