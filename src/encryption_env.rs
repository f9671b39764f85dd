//! C7 — `EncryptionEnv`, a scratch-buffer AEAD facade.
//!
//! Grounded on the original implementation's `EncryptionEnv`/`CryptoSet`
//! (fields `key`, `iv`, `authTag`, `plaintext`, `ciphertext` reused across
//! calls, `generateParameters`/`startEncryption`/`startDecryption`). Per
//! spec.md §9.3, the 12-byte IV is normative for both supported algorithms
//! even though the original's AES-GCM path once sized it at 16.

use crate::aead::{self, Algorithm};
use crate::constants::{AEAD_IV_LENGTH, AEAD_KEY_LENGTH, AEAD_TAG_LENGTH};
use crate::error::CoreError;
use crate::rng::random_bytes;

/// Holds the key/IV/tag/plaintext/ciphertext scratch buffers for one AEAD
/// algorithm, reused across successive seal/open calls the way the original
/// reused a single `EncryptionEnv` instance per session.
pub struct EncryptionEnv {
    algo: Algorithm,
    key: Option<Vec<u8>>,
    iv: Option<Vec<u8>>,
    auth_tag: Option<[u8; AEAD_TAG_LENGTH]>,
    plaintext: Option<Vec<u8>>,
    ciphertext: Option<Vec<u8>>,
}

impl EncryptionEnv {
    /// An environment with no key/IV material loaded yet.
    pub fn new(algo: Algorithm) -> Self {
        EncryptionEnv {
            algo,
            key: None,
            iv: None,
            auth_tag: None,
            plaintext: None,
            ciphertext: None,
        }
    }

    /// Draws a fresh random key and IV (`generateParameters`).
    pub fn generate_parameters(&mut self) -> Result<(), CoreError> {
        self.key = Some(random_bytes(AEAD_KEY_LENGTH)?);
        self.iv = Some(random_bytes(AEAD_IV_LENGTH)?);
        Ok(())
    }

    /// Installs caller-supplied key material in place of drawing fresh
    /// parameters, as when a ratchet step derives the key/IV from the chain
    /// rather than from the RNG.
    pub fn set_key_iv(&mut self, key: &[u8], iv: &[u8]) -> Result<(), CoreError> {
        if key.len() != AEAD_KEY_LENGTH || iv.len() != AEAD_IV_LENGTH {
            return Err(CoreError::InvalidKey);
        }
        self.key = Some(key.to_vec());
        self.iv = Some(iv.to_vec());
        Ok(())
    }

    /// Seals `plaintext` under the loaded key/IV, filling the `ciphertext`
    /// and `authTag` scratch fields (`startEncryption`).
    pub fn start_encryption(&mut self, plaintext: &[u8]) -> Result<(), CoreError> {
        let key = self
            .key
            .as_ref()
            .ok_or(CoreError::PreconditionError("encryption requested before key/iv set"))?;
        let iv = self
            .iv
            .as_ref()
            .ok_or(CoreError::PreconditionError("encryption requested before key/iv set"))?;
        let (ciphertext, tag) = aead::seal(self.algo, key, iv, plaintext)?;
        self.plaintext = Some(plaintext.to_vec());
        self.ciphertext = Some(ciphertext);
        self.auth_tag = Some(tag);
        Ok(())
    }

    /// Opens `ciphertext`/`auth_tag` under the loaded key/IV, filling the
    /// `plaintext` scratch field (`startDecryption`).
    pub fn start_decryption(&mut self, ciphertext: &[u8], auth_tag: &[u8]) -> Result<(), CoreError> {
        let key = self
            .key
            .as_ref()
            .ok_or(CoreError::PreconditionError("decryption requested before key/iv set"))?;
        let iv = self
            .iv
            .as_ref()
            .ok_or(CoreError::PreconditionError("decryption requested before key/iv set"))?;
        let plaintext = aead::open(self.algo, key, iv, ciphertext, auth_tag)?;
        self.ciphertext = Some(ciphertext.to_vec());
        let mut tag = [0u8; AEAD_TAG_LENGTH];
        tag.copy_from_slice(auth_tag);
        self.auth_tag = Some(tag);
        self.plaintext = Some(plaintext);
        Ok(())
    }

    pub fn key(&self) -> Result<&[u8], CoreError> {
        self.key.as_deref().ok_or(CoreError::PreconditionError("key not yet set"))
    }

    pub fn iv(&self) -> Result<&[u8], CoreError> {
        self.iv.as_deref().ok_or(CoreError::PreconditionError("iv not yet set"))
    }

    pub fn auth_tag(&self) -> Result<&[u8; AEAD_TAG_LENGTH], CoreError> {
        self.auth_tag
            .as_ref()
            .ok_or(CoreError::PreconditionError("auth tag not yet available"))
    }

    pub fn plaintext(&self) -> Result<&[u8], CoreError> {
        self.plaintext
            .as_deref()
            .ok_or(CoreError::PreconditionError("plaintext not yet available"))
    }

    pub fn ciphertext(&self) -> Result<&[u8], CoreError> {
        self.ciphertext
            .as_deref()
            .ok_or(CoreError::PreconditionError("ciphertext not yet available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_before_parameters() {
        let mut env = EncryptionEnv::new(Algorithm::Aes256Gcm);
        assert!(matches!(
            env.start_encryption(b"hi"),
            Err(CoreError::PreconditionError(_))
        ));
    }

    #[test]
    fn round_trip_through_two_environments() {
        let mut sender = EncryptionEnv::new(Algorithm::ChaCha20Poly1305);
        sender.generate_parameters().unwrap();
        sender.start_encryption(b"secret message").unwrap();

        let mut receiver = EncryptionEnv::new(Algorithm::ChaCha20Poly1305);
        receiver
            .set_key_iv(sender.key().unwrap(), sender.iv().unwrap())
            .unwrap();
        receiver
            .start_decryption(sender.ciphertext().unwrap(), sender.auth_tag().unwrap())
            .unwrap();
        assert_eq!(receiver.plaintext().unwrap(), b"secret message");
    }

    #[test]
    fn generate_parameters_draws_normative_iv_length() {
        let mut env = EncryptionEnv::new(Algorithm::Aes256Gcm);
        env.generate_parameters().unwrap();
        assert_eq!(env.iv().unwrap().len(), AEAD_IV_LENGTH);
    }
}
