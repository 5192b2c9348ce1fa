//! Operator authentication
//!
//! A single shared secret guards the operator surface. A successful login
//! mints a random opaque token. Tokens are currently not checked by the
//! other endpoints; they exist so the presentation layer has something to
//! hold on to, and enforcing them is a known open gap.

use rand::RngCore;

/// Length of the session token in bytes (before hex encoding)
const TOKEN_LENGTH: usize = 32;

/// Check a presented credential against the configured shared secret.
///
/// An empty configured secret never matches; startup validation should
/// have rejected that configuration already.
pub fn verify_password(presented: &str, expected: &str) -> bool {
    !expected.is_empty() && presented == expected
}

/// Generate a new random session token (hex-encoded)
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
