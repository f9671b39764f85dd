//! C5 — X25519 keypair generation, import/export, and Diffie-Hellman.
//!
//! Grounded on the teacher's `PrivateKey`/`PublicKey` types in `utils.rs`
//! (`x25519_dalek::StaticSecret`, base64 round-tripping), merged into a
//! single owning `KeyPair` type per spec.md §3 ("KeyPair owns both the
//! 32-byte private scalar and 32-byte public point... deletion of the
//! KeyPair scrubs the private half") and extended with DER/PEM import/export
//! (spec.md §4.3), which the teacher only needed base64 for.

use arrayref::array_ref;
use x25519_dalek::{PublicKey as DalekPublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::constants::CURVE25519_LENGTH;
use crate::error::CoreError;

/// RFC 8410 `PrivateKeyInfo` prefix for an unencrypted X25519 private key
/// (algorithm identifier `1.3.101.110`, version 0), immediately followed by
/// the raw 32-byte scalar wrapped in its own OCTET STRING.
const DER_PRIVATE_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x6e, 0x04, 0x22, 0x04, 0x20,
];

/// RFC 8410 `SubjectPublicKeyInfo` prefix for an X25519 public key,
/// immediately followed by the raw 32-byte point.
const DER_PUBLIC_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x6e, 0x03, 0x21, 0x00,
];

/// Import/export encodings for key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFormat {
    /// No import intended; used as a placeholder default.
    None,
    /// Raw 32-byte scalar/point.
    Raw,
    /// RFC 8410 DER encoding.
    Der,
    /// PEM armor around the DER encoding.
    Pem,
}

/// An X25519 keypair. `public` always equals `X25519_base_mult(private)`.
#[derive(Clone, ZeroizeOnDrop)]
pub struct KeyPair {
    private: [u8; CURVE25519_LENGTH],
    #[zeroize(skip)]
    public: [u8; CURVE25519_LENGTH],
}

impl KeyPair {
    /// Generates a fresh random keypair.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(rand::rngs::OsRng);
        let public = DalekPublicKey::from(&secret);
        KeyPair {
            private: secret.to_bytes(),
            public: public.to_bytes(),
        }
    }

    /// Accepts raw 32-byte private/public halves, re-deriving the public key
    /// from the private scalar and rejecting the pair if it does not match
    /// the caller-supplied public half.
    pub fn load_raw(private: &[u8], public: &[u8]) -> Result<Self, CoreError> {
        if private.len() != CURVE25519_LENGTH || public.len() != CURVE25519_LENGTH {
            return Err(CoreError::InvalidKey);
        }
        let priv_arr = *array_ref![private, 0, CURVE25519_LENGTH];
        let secret = StaticSecret::from(priv_arr);
        let derived_public = DalekPublicKey::from(&secret);
        if derived_public.to_bytes() != *array_ref![public, 0, CURVE25519_LENGTH] {
            return Err(CoreError::InvalidKey);
        }
        Ok(KeyPair {
            private: priv_arr,
            public: derived_public.to_bytes(),
        })
    }

    /// Imports a keypair in the given format. `Raw` delegates to
    /// [`KeyPair::load_raw`]; `Der`/`Pem` unwrap their envelope first.
    pub fn import(format: KeyFormat, private: &[u8], public: &[u8]) -> Result<Self, CoreError> {
        match format {
            KeyFormat::None => Err(CoreError::InvalidKey),
            KeyFormat::Raw => Self::load_raw(private, public),
            KeyFormat::Der => {
                let priv_raw = unwrap_der_private(private)?;
                let pub_raw = unwrap_der_public(public)?;
                Self::load_raw(&priv_raw, &pub_raw)
            }
            KeyFormat::Pem => {
                let priv_der = pem::parse(private).map_err(|_| CoreError::InvalidKey)?;
                let pub_der = pem::parse(public).map_err(|_| CoreError::InvalidKey)?;
                let priv_raw = unwrap_der_private(priv_der.contents())?;
                let pub_raw = unwrap_der_public(pub_der.contents())?;
                Self::load_raw(&priv_raw, &pub_raw)
            }
        }
    }

    /// The 32-byte public point.
    pub fn public_bytes(&self) -> [u8; CURVE25519_LENGTH] {
        self.public
    }

    /// The 32-byte private scalar, as raw bytes.
    pub fn private_bytes_raw(&self) -> Vec<u8> {
        self.private.to_vec()
    }

    /// DER encoding of the private key (RFC 8410 `PrivateKeyInfo`).
    pub fn private_bytes_der(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DER_PRIVATE_PREFIX.len() + CURVE25519_LENGTH);
        out.extend_from_slice(&DER_PRIVATE_PREFIX);
        out.extend_from_slice(&self.private);
        out
    }

    /// PEM armor around [`KeyPair::private_bytes_der`].
    pub fn private_bytes_pem(&self) -> String {
        pem::encode(&pem::Pem::new("PRIVATE KEY", self.private_bytes_der()))
    }

    /// DER encoding of the public key (RFC 8410 `SubjectPublicKeyInfo`).
    pub fn public_bytes_der(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DER_PUBLIC_PREFIX.len() + CURVE25519_LENGTH);
        out.extend_from_slice(&DER_PUBLIC_PREFIX);
        out.extend_from_slice(&self.public);
        out
    }

    /// PEM armor around [`KeyPair::public_bytes_der`].
    pub fn public_bytes_pem(&self) -> String {
        pem::encode(&pem::Pem::new("PUBLIC KEY", self.public_bytes_der()))
    }

    /// X25519 scalar multiplication against `peer_public`. Rejects an
    /// all-zero output (a weak/low-order peer public key).
    pub fn diffie_hellman(&self, peer_public: &[u8]) -> Result<[u8; CURVE25519_LENGTH], CoreError> {
        if peer_public.len() != CURVE25519_LENGTH {
            return Err(CoreError::InvalidKey);
        }
        let secret = StaticSecret::from(self.private);
        let peer = DalekPublicKey::from(*array_ref![peer_public, 0, CURVE25519_LENGTH]);
        let shared = secret.diffie_hellman(&peer);
        let bytes = shared.to_bytes();
        if bytes == [0u8; CURVE25519_LENGTH] {
            return Err(CoreError::InvalidKey);
        }
        Ok(bytes)
    }
}

fn unwrap_der_private(der: &[u8]) -> Result<Vec<u8>, CoreError> {
    if der.len() != DER_PRIVATE_PREFIX.len() + CURVE25519_LENGTH
        || der[..DER_PRIVATE_PREFIX.len()] != DER_PRIVATE_PREFIX
    {
        return Err(CoreError::InvalidKey);
    }
    Ok(der[DER_PRIVATE_PREFIX.len()..].to_vec())
}

fn unwrap_der_public(der: &[u8]) -> Result<Vec<u8>, CoreError> {
    if der.len() != DER_PUBLIC_PREFIX.len() + CURVE25519_LENGTH
        || der[..DER_PUBLIC_PREFIX.len()] != DER_PUBLIC_PREFIX
    {
        return Err(CoreError::InvalidKey);
    }
    Ok(der[DER_PUBLIC_PREFIX.len()..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_matches_base_mult_of_private() {
        let kp = KeyPair::generate();
        let secret = StaticSecret::from(kp.private);
        let expected = DalekPublicKey::from(&secret);
        assert_eq!(kp.public_bytes(), expected.to_bytes());
    }

    #[test]
    fn load_raw_rejects_mismatched_pair() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let result = KeyPair::load_raw(&a.private_bytes_raw(), &b.public_bytes());
        assert!(matches!(result, Err(CoreError::InvalidKey)));
    }

    #[test]
    fn load_raw_rejects_wrong_length() {
        let result = KeyPair::load_raw(&[0u8; 31], &[0u8; 32]);
        assert!(matches!(result, Err(CoreError::InvalidKey)));
    }

    #[test]
    fn diffie_hellman_is_symmetric() {
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        let shared_a = a.diffie_hellman(&b.public_bytes()).unwrap();
        let shared_b = b.diffie_hellman(&a.public_bytes()).unwrap();
        assert_eq!(shared_a, shared_b);
    }

    #[test]
    fn der_round_trip() {
        let kp = KeyPair::generate();
        let priv_der = kp.private_bytes_der();
        let pub_der = kp.public_bytes_der();
        let restored = KeyPair::import(KeyFormat::Der, &priv_der, &pub_der).unwrap();
        assert_eq!(restored.public_bytes(), kp.public_bytes());
    }

    #[test]
    fn pem_round_trip() {
        let kp = KeyPair::generate();
        let priv_pem = kp.private_bytes_pem();
        let pub_pem = kp.public_bytes_pem();
        let restored =
            KeyPair::import(KeyFormat::Pem, priv_pem.as_bytes(), pub_pem.as_bytes()).unwrap();
        assert_eq!(restored.public_bytes(), kp.public_bytes());
    }
}
