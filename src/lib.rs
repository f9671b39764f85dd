//! A Double Ratchet session engine for end-to-end encrypted messaging.
//!
//! Combines X25519 Diffie-Hellman, an HKDF/SHA3-512 chain, and a choice of
//! AES-256-GCM or ChaCha20-Poly1305 into the same shape the original
//! implementation this crate is grounded on used: a self-describing,
//! fixed-layout message header in front of an AEAD-sealed body, and a
//! ratchet state machine that steps forward on every message and re-keys on
//! every DH change.
//!
//! This crate is the cryptographic core only. It has no opinion about
//! transport, storage, presence, or how two parties agree on their first
//! shared secret — that material has to come from wherever the surrounding
//! application already gets it.

pub mod aead;
pub mod config;
pub mod constants;
pub mod encryption_env;
pub mod error;
pub mod hash;
pub mod header;
pub mod kdf;
pub mod key_env;
pub mod keypair;
pub mod ratchet;
pub mod rng;
pub mod state;

pub use aead::Algorithm;
pub use config::CipherSuite;
pub use error::CoreError;
pub use hash::HashAlgorithm;
pub use header::Header;
pub use key_env::KeyEnv;
pub use keypair::{KeyFormat, KeyPair};
pub use ratchet::DoubleRatchet;
pub use state::{RatchetState, SessionRole};
