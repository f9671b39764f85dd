//! Fixed sizes and KDF labels shared by every module in the core.

/// Byte length of an X25519 scalar (private key) and point (public key).
pub(crate) const CURVE25519_LENGTH: usize = 32;

/// Byte length of an AES-256 / ChaCha20 key.
pub(crate) const AEAD_KEY_LENGTH: usize = 32;

/// Byte length of the IV used by both supported AEAD algorithms.
///
/// Normative per spec: early prototypes of this protocol sized the AES-GCM
/// IV at 16 bytes; the wire format and [`crate::key_env::KeyEnv`] both settled
/// on 12.
pub(crate) const AEAD_IV_LENGTH: usize = 12;

/// Byte length of an AEAD authentication tag.
pub(crate) const AEAD_TAG_LENGTH: usize = 16;

/// Byte length of a BLAKE2b-512 digest.
pub(crate) const BLAKE2B_LENGTH: usize = 64;

/// Byte length of a BLAKE2s-256 digest.
pub(crate) const BLAKE2S_LENGTH: usize = 32;

/// Byte length of a root/chain/message key.
pub(crate) const SECRET_LENGTH: usize = 32;

/// Fixed header layout: iv || authTag || senderPub || receiverPub || sendMsgNum || messageLength.
pub(crate) const HEADER_LENGTH: usize =
    AEAD_IV_LENGTH + AEAD_TAG_LENGTH + CURVE25519_LENGTH + CURVE25519_LENGTH + 4 + 4;

/// Minimum valid package length: header with zero-length ciphertext.
pub(crate) const MIN_PACKAGE_LENGTH: usize = HEADER_LENGTH;

/// Fixed 16-byte salt used to derive the initial root key, `0x00..=0x0F`.
pub(crate) const INITIAL_ROOT_SALT: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
];

/// KDF info label for the initial root-chain derivation.
pub(crate) const LABEL_INITIAL_ROOT_KEY: &[u8] = b"InitialRootKey";

/// KDF info label for a symmetric (chain) ratchet step, used identically by
/// both the send path and the lazy receive-side derivation.
pub(crate) const LABEL_SEND_CHAIN_STEP: &[u8] = b"SendChainStep";

/// KDF info label for a DH ratchet root-key update.
pub(crate) const LABEL_DH_RATCHET_UPDATE: &[u8] = b"DH-Ratchet-Update";

/// Default bound on the number of not-yet-consumed message keys retained for
/// out-of-order delivery (spec.md §9, open question 6).
pub(crate) const DEFAULT_MAX_SKIPPED_KEYS: usize = 1024;
