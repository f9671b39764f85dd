//! C1 — cryptographically secure random bytes.
//!
//! The rest of the crate draws randomness through [`OsRng`] directly (via
//! `x25519_dalek`/`aes_gcm`/`chacha20poly1305`'s own RNG parameters) wherever
//! those crates accept one; this module exists for the few call sites that
//! need raw random bytes themselves — IV generation in
//! [`crate::key_env::KeyEnv`] and [`crate::encryption_env::EncryptionEnv`].

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CoreError;

/// Draws `n` cryptographically secure random bytes from the OS entropy
/// source. Failure is fatal for the calling operation (spec.md §7,
/// `RngFailure`).
pub fn random_bytes(n: usize) -> Result<Vec<u8>, CoreError> {
    let mut out = vec![0u8; n];
    OsRng.try_fill_bytes(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_requested_length() {
        let bytes = random_bytes(32).unwrap();
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn draws_are_not_trivially_repeated() {
        let a = random_bytes(32).unwrap();
        let b = random_bytes(32).unwrap();
        assert_ne!(a, b);
    }
}
