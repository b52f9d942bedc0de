//! JWK Thumbprint calculation per RFC 7638.
//!
//! The thumbprint of the RSA public key is the key id (`kid`) placed in
//! token headers and in the published JWK.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Computes the SHA-256 thumbprint of an RSA public key given its
/// base64url-encoded modulus and exponent.
///
/// Per RFC 7638 the required members `e`, `kty`, `n` are hashed in
/// lexicographic order with no whitespace.
#[must_use]
pub fn rsa_thumbprint(n: &str, e: &str) -> String {
    let canonical = format!(r#"{{"e":"{e}","kty":"RSA","n":"{n}"}}"#);
    let hash = Sha256::digest(canonical.as_bytes());
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, hash)
}

/// Compares two key ids in constant time.
#[must_use]
pub fn key_ids_match(presented: &str, expected: &str) -> bool {
    let presented = presented.as_bytes();
    let expected = expected.as_bytes();

    // Length check first (this leaks length but that's acceptable)
    if presented.len() != expected.len() {
        return false;
    }

    presented.ct_eq(expected).into()
}
