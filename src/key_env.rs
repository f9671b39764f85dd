//! C6 — `KeyEnv`, a discriminated container around either a random key/IV
//! pair or an X25519 keypair.
//!
//! Grounded on the original implementation's `KeyEnv`/`KeyType` (`KeyIv` vs
//! `X25519Keypair`, `setKeyIvSizes`/`startKeyIvGeneration`/
//! `startKeyPairGeneration`/`getKeyPair`, each accessor throwing if called
//! before generation). Expressed here as an enum rather than a flag-and-field
//! bag, since Rust's enums make illegal states (e.g. reading `iv` out of an
//! `X25519Keypair` variant) unrepresentable at the type level.

use crate::error::CoreError;
use crate::keypair::KeyPair;
use crate::rng::random_bytes;

/// Either an uninitialized or generated key/IV pair of caller-chosen sizes,
/// or an uninitialized or generated X25519 keypair.
pub enum KeyEnv {
    KeyIv {
        key_len: usize,
        iv_len: usize,
        key: Option<Vec<u8>>,
        iv: Option<Vec<u8>>,
    },
    X25519Keypair {
        keypair: Option<KeyPair>,
    },
}

impl KeyEnv {
    /// An ungenerated key/IV container sized for `key_len`/`iv_len` bytes
    /// respectively (mirrors `setKeyIvSizes`).
    pub fn key_iv(key_len: usize, iv_len: usize) -> Self {
        KeyEnv::KeyIv {
            key_len,
            iv_len,
            key: None,
            iv: None,
        }
    }

    /// An ungenerated X25519 keypair container.
    pub fn x25519() -> Self {
        KeyEnv::X25519Keypair { keypair: None }
    }

    /// Draws fresh random material for this container (`startKeyIvGeneration`
    /// / `startKeyPairGeneration(generate = true)`).
    pub fn generate(&mut self) -> Result<(), CoreError> {
        match self {
            KeyEnv::KeyIv { key_len, iv_len, key, iv } => {
                *key = Some(random_bytes(*key_len)?);
                *iv = Some(random_bytes(*iv_len)?);
            }
            KeyEnv::X25519Keypair { keypair } => {
                *keypair = Some(KeyPair::generate());
            }
        }
        Ok(())
    }

    /// Installs a caller-supplied keypair in place of generating one
    /// (`startKeyPairGeneration(generate = false)` loading an existing pair).
    pub fn load_keypair(&mut self, keypair: KeyPair) -> Result<(), CoreError> {
        match self {
            KeyEnv::X25519Keypair { keypair: slot } => {
                *slot = Some(keypair);
                Ok(())
            }
            KeyEnv::KeyIv { .. } => Err(CoreError::PreconditionError(
                "load_keypair called on a KeyIv environment",
            )),
        }
    }

    /// The generated key, if this is a `KeyIv` container that has been
    /// generated.
    pub fn key(&self) -> Result<&[u8], CoreError> {
        match self {
            KeyEnv::KeyIv { key: Some(k), .. } => Ok(k),
            KeyEnv::KeyIv { key: None, .. } => {
                Err(CoreError::PreconditionError("key requested before generation"))
            }
            KeyEnv::X25519Keypair { .. } => {
                Err(CoreError::PreconditionError("key requested on a keypair environment"))
            }
        }
    }

    /// The generated IV, if this is a `KeyIv` container that has been
    /// generated.
    pub fn iv(&self) -> Result<&[u8], CoreError> {
        match self {
            KeyEnv::KeyIv { iv: Some(v), .. } => Ok(v),
            KeyEnv::KeyIv { iv: None, .. } => {
                Err(CoreError::PreconditionError("iv requested before generation"))
            }
            KeyEnv::X25519Keypair { .. } => {
                Err(CoreError::PreconditionError("iv requested on a keypair environment"))
            }
        }
    }

    /// The generated keypair, if this is an `X25519Keypair` container that
    /// has been generated or loaded (`getKeyPair`, which throws if called too
    /// early).
    pub fn keypair(&self) -> Result<&KeyPair, CoreError> {
        match self {
            KeyEnv::X25519Keypair { keypair: Some(kp) } => Ok(kp),
            KeyEnv::X25519Keypair { keypair: None } => {
                Err(CoreError::PreconditionError("keypair requested before generation"))
            }
            KeyEnv::KeyIv { .. } => {
                Err(CoreError::PreconditionError("keypair requested on a key/iv environment"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_iv_precondition_before_generate() {
        let env = KeyEnv::key_iv(32, 12);
        assert!(matches!(env.key(), Err(CoreError::PreconditionError(_))));
        assert!(matches!(env.iv(), Err(CoreError::PreconditionError(_))));
    }

    #[test]
    fn key_iv_generate_produces_requested_sizes() {
        let mut env = KeyEnv::key_iv(32, 12);
        env.generate().unwrap();
        assert_eq!(env.key().unwrap().len(), 32);
        assert_eq!(env.iv().unwrap().len(), 12);
    }

    #[test]
    fn keypair_precondition_before_generate() {
        let env = KeyEnv::x25519();
        assert!(matches!(env.keypair(), Err(CoreError::PreconditionError(_))));
    }

    #[test]
    fn keypair_generate_then_access() {
        let mut env = KeyEnv::x25519();
        env.generate().unwrap();
        assert!(env.keypair().is_ok());
    }

    #[test]
    fn cross_variant_access_is_rejected() {
        let mut kv = KeyEnv::key_iv(32, 12);
        kv.generate().unwrap();
        assert!(matches!(kv.keypair(), Err(CoreError::PreconditionError(_))));

        let mut kp = KeyEnv::x25519();
        kp.generate().unwrap();
        assert!(matches!(kp.key(), Err(CoreError::PreconditionError(_))));
    }
}
