//! C2 — AES-256-GCM and ChaCha20-Poly1305 seal/open.
//!
//! Grounded on the teacher's `EncryptionKey::encrypt`/`DecryptionKey::decrypt`
//! (`aes_gcm::Aes256Gcm` + `Payload`), generalized to a two-algorithm facade
//! the way `dl_crypto::aead` structures its seal/open pair, and narrowed from
//! AAD-bearing encryption to the no-AAD contract spec.md §4.1/§9.4 specifies
//! (the header is not authenticated as associated data by design).

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce as AesNonce};
use chacha20poly1305::{ChaCha20Poly1305, Nonce as ChaChaNonce};

use crate::constants::{AEAD_IV_LENGTH, AEAD_KEY_LENGTH, AEAD_TAG_LENGTH};
use crate::error::CoreError;

/// Which AEAD primitive a seal/open call uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Algorithm {
    Aes256Gcm,
    ChaCha20Poly1305,
}

/// Seals `plaintext` under `key`/`iv`, returning `(ciphertext, tag)`.
///
/// `ciphertext.len() == plaintext.len()`; the 16-byte tag is returned
/// separately rather than appended, matching the wire header's layout
/// (spec.md §3 carries `authTag` ahead of the ciphertext body).
pub fn seal(
    algo: Algorithm,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; AEAD_TAG_LENGTH]), CoreError> {
    if key.len() != AEAD_KEY_LENGTH || iv.len() != AEAD_IV_LENGTH {
        return Err(CoreError::InvalidKey);
    }
    let mut sealed = match algo {
        Algorithm::Aes256Gcm => {
            let cipher =
                Aes256Gcm::new_from_slice(key).map_err(|_| CoreError::InvalidKey)?;
            let nonce = AesNonce::from_slice(iv);
            cipher
                .encrypt(nonce, Payload { msg: plaintext, aad: &[] })
                .map_err(CoreError::from)?
        }
        Algorithm::ChaCha20Poly1305 => {
            let cipher =
                ChaCha20Poly1305::new_from_slice(key).map_err(|_| CoreError::InvalidKey)?;
            let nonce = ChaChaNonce::from_slice(iv);
            cipher
                .encrypt(nonce, Payload { msg: plaintext, aad: &[] })
                .map_err(CoreError::from)?
        }
    };
    let tag_start = sealed.len() - AEAD_TAG_LENGTH;
    let tag_bytes = sealed.split_off(tag_start);
    let mut tag = [0u8; AEAD_TAG_LENGTH];
    tag.copy_from_slice(&tag_bytes);
    Ok((sealed, tag))
}

/// Opens `ciphertext`/`tag` under `key`/`iv`. Any authentication failure from
/// the underlying primitive is surfaced as [`CoreError::AuthFailure`] — no
/// plaintext is ever returned on failure (spec.md §4.1).
pub fn open(
    algo: Algorithm,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CoreError> {
    if key.len() != AEAD_KEY_LENGTH || iv.len() != AEAD_IV_LENGTH || tag.len() != AEAD_TAG_LENGTH {
        return Err(CoreError::AuthFailure);
    }
    let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    match algo {
        Algorithm::Aes256Gcm => {
            let cipher =
                Aes256Gcm::new_from_slice(key).map_err(|_| CoreError::AuthFailure)?;
            let nonce = AesNonce::from_slice(iv);
            cipher
                .decrypt(nonce, Payload { msg: &combined, aad: &[] })
                .map_err(|_| CoreError::AuthFailure)
        }
        Algorithm::ChaCha20Poly1305 => {
            let cipher =
                ChaCha20Poly1305::new_from_slice(key).map_err(|_| CoreError::AuthFailure)?;
            let nonce = ChaChaNonce::from_slice(iv);
            cipher
                .decrypt(nonce, Payload { msg: &combined, aad: &[] })
                .map_err(|_| CoreError::AuthFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key32() -> Vec<u8> {
        vec![0x42u8; AEAD_KEY_LENGTH]
    }

    fn iv12() -> Vec<u8> {
        vec![0x24u8; AEAD_IV_LENGTH]
    }

    #[test]
    fn round_trip_aes_gcm() {
        let (ct, tag) = seal(Algorithm::Aes256Gcm, &key32(), &iv12(), b"hello").unwrap();
        assert_eq!(ct.len(), b"hello".len());
        let pt = open(Algorithm::Aes256Gcm, &key32(), &iv12(), &ct, &tag).unwrap();
        assert_eq!(pt, b"hello");
    }

    #[test]
    fn round_trip_chacha20poly1305() {
        let (ct, tag) =
            seal(Algorithm::ChaCha20Poly1305, &key32(), &iv12(), b"hello").unwrap();
        let pt = open(Algorithm::ChaCha20Poly1305, &key32(), &iv12(), &ct, &tag).unwrap();
        assert_eq!(pt, b"hello");
    }

    #[test]
    fn tampered_tag_fails() {
        let (ct, mut tag) = seal(Algorithm::Aes256Gcm, &key32(), &iv12(), b"hello").unwrap();
        tag[0] ^= 0xFF;
        let result = open(Algorithm::Aes256Gcm, &key32(), &iv12(), &ct, &tag);
        assert!(matches!(result, Err(CoreError::AuthFailure)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let (mut ct, tag) = seal(Algorithm::Aes256Gcm, &key32(), &iv12(), b"hello").unwrap();
        ct[0] ^= 0xFF;
        let result = open(Algorithm::Aes256Gcm, &key32(), &iv12(), &ct, &tag);
        assert!(matches!(result, Err(CoreError::AuthFailure)));
    }

    #[test]
    fn wrong_key_fails() {
        let (ct, tag) = seal(Algorithm::Aes256Gcm, &key32(), &iv12(), b"hello").unwrap();
        let wrong_key = vec![0x99u8; AEAD_KEY_LENGTH];
        let result = open(Algorithm::Aes256Gcm, &wrong_key, &iv12(), &ct, &tag);
        assert!(matches!(result, Err(CoreError::AuthFailure)));
    }
}
