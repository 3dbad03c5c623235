//! Handshake key and digest utilities.
//!
//! Clients never send a secret in the clear. They send
//! `hex(sha256(secret ++ random_key))`, where `random_key` was issued by the
//! random-key handshake on the same connection.

use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of issued random keys and login keys.
pub const KEY_LEN: usize = 32;

/// Lowercase hex SHA-256 of `input`.
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Digest a client must present to prove knowledge of `secret`.
pub fn expected_digest(secret: &str, random_key: &str) -> String {
    sha256_hex(&format!("{secret}{random_key}"))
}

/// Compare two digests in constant time, ignoring ASCII case.
pub fn digest_matches(presented: &str, expected: &str) -> bool {
    let presented = presented.to_ascii_lowercase();
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Fresh alphanumeric key.
pub fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_concatenates_secret_and_key() {
        assert_eq!(expected_digest("a", "bc"), sha256_hex("abc"));
    }

    #[test]
    fn digest_comparison() {
        let expected = expected_digest("hash", "key");
        assert!(digest_matches(&expected, &expected));
        assert!(digest_matches(&expected.to_uppercase(), &expected));
        assert!(!digest_matches("", &expected));
        assert!(!digest_matches(&expected[1..], &expected));
    }

    #[test]
    fn generated_keys_are_fresh() {
        let a = generate_key();
        let b = generate_key();
        assert_eq!(a.len(), KEY_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
