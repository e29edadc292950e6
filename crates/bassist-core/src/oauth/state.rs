//! Per-attempt OAuth `state` tokens for CSRF protection.

use base64::prelude::*;

use crate::error::OAuthError;

const STATE_BYTES: usize = 32;

/// Generate a cryptographically random, URL-safe state parameter.
pub fn generate_state() -> Result<String, OAuthError> {
    let mut bytes = [0u8; STATE_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| OAuthError::StateGeneration(e.to_string()))?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(bytes))
}

/// Compare a returned state with the expected one without short-circuiting
/// on the first differing byte.
pub fn states_match(expected: &str, returned: &str) -> bool {
    let (a, b) = (expected.as_bytes(), returned.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
