//! Password hashing and salt generation
//!
//! Stored passwords are `hex(SHA1(salt || password))` and must stay
//! byte-for-byte stable across releases.

use chrono::Utc;
use sha1::{Digest, Sha1};

/// Hash a plaintext password with the user's salt.
///
/// Returns the lowercase hex digest of `SHA1(salt || password)`.
#[must_use]
pub fn calculate_pass_hash(password: &str, salt: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a fresh salt from the current time in nanoseconds.
///
/// Two calls within the same clock tick may return the same salt.
#[must_use]
pub fn new_salt() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut hasher = Sha1::new();
    hasher.update(nanos.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a plaintext password against a stored hash.
#[must_use]
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    calculate_pass_hash(password, salt) == stored_hash
}
