//! Error taxonomy for the cryptographic core.
//!
//! Mirrors the teacher crate's hand-rolled `X3DHError`/`RatchetError` split,
//! collapsed into a single enum now that X3DH is out of scope: every
//! fallible operation in this crate returns `Result<T, CoreError>`.

use std::fmt::{Display, Formatter};

/// Errors produced by the cryptographic core.
#[derive(Debug)]
pub enum CoreError {
    /// Wrong-length or low-order public key, or a keypair load that failed
    /// the `public == base_mult(private)` check.
    InvalidKey,

    /// A `KeyEnv` accessor was called before sizes were set or before
    /// `generate`/`generate_or_load` ran.
    PreconditionError(&'static str),

    /// The receive buffer was shorter than the minimum package length, or a
    /// header field read past the end of the buffer.
    MalformedPackage,

    /// AEAD tag verification failed; no plaintext is returned.
    AuthFailure,

    /// A `RatchetState` snapshot failed length or counter-coherence
    /// validation during `restore`.
    CorruptState(&'static str),

    /// The OS entropy source failed to fill a buffer.
    RngFailure,

    /// The underlying HKDF primitive rejected its inputs (output too long
    /// for the PRF).
    KdfFailure(hkdf::InvalidLength),

    /// Too many sequence numbers were skipped in one jump; bails out before
    /// attempting to derive an unbounded number of message keys.
    MaxSkipsExceeded,

    /// An internal invariant was violated (e.g. a message key that a prior
    /// step claimed to derive is absent). Indicates a bug, not bad input.
    Internal(&'static str),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidKey => write!(f, "invalid key material"),
            CoreError::PreconditionError(what) => write!(f, "precondition not met: {what}"),
            CoreError::MalformedPackage => write!(f, "malformed package"),
            CoreError::AuthFailure => write!(f, "authentication failure"),
            CoreError::CorruptState(what) => write!(f, "corrupt session state: {what}"),
            CoreError::RngFailure => write!(f, "random number generator failure"),
            CoreError::KdfFailure(e) => write!(f, "key derivation failure: {e}"),
            CoreError::MaxSkipsExceeded => write!(f, "max skipped message keys exceeded"),
            CoreError::Internal(what) => write!(f, "internal error: {what}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<hkdf::InvalidLength> for CoreError {
    fn from(value: hkdf::InvalidLength) -> Self {
        CoreError::KdfFailure(value)
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_value: aes_gcm::Error) -> Self {
        CoreError::AuthFailure
    }
}

impl From<chacha20poly1305::Error> for CoreError {
    fn from(_value: chacha20poly1305::Error) -> Self {
        CoreError::AuthFailure
    }
}

impl From<rand::Error> for CoreError {
    fn from(_value: rand::Error) -> Self {
        CoreError::RngFailure
    }
}
