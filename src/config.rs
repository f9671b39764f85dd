//! Ambient configuration: which AEAD algorithm and skipped-key bound a
//! session uses.
//!
//! The original implementation selected its cipher by constructing a
//! `CryptoSet` with a fixed set of capabilities; this crate surfaces the
//! same choice as a small `serde`-serializable value object rather than a
//! config file or CLI flag — loading one from disk or the environment is
//! out of scope here, same as it is for the teacher's sibling crates, which
//! each own their own `config` crate for that.

use serde::{Deserialize, Serialize};

use crate::aead::Algorithm;
use crate::constants::DEFAULT_MAX_SKIPPED_KEYS;

/// The cipher and bookkeeping choices a [`crate::ratchet::DoubleRatchet`]
/// session is constructed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherSuite {
    pub algorithm: Algorithm,
    pub max_skipped_keys: usize,
}

impl CipherSuite {
    pub fn new(algorithm: Algorithm, max_skipped_keys: usize) -> Self {
        CipherSuite { algorithm, max_skipped_keys }
    }
}

impl Default for CipherSuite {
    /// AES-256-GCM with the spec-mandated 1024-entry skipped-key bound.
    fn default() -> Self {
        CipherSuite {
            algorithm: Algorithm::Aes256Gcm,
            max_skipped_keys: DEFAULT_MAX_SKIPPED_KEYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_aes_gcm_with_spec_bound() {
        let suite = CipherSuite::default();
        assert_eq!(suite.algorithm, Algorithm::Aes256Gcm);
        assert_eq!(suite.max_skipped_keys, DEFAULT_MAX_SKIPPED_KEYS);
    }

    #[test]
    fn custom_suite_keeps_caller_choices() {
        let suite = CipherSuite::new(Algorithm::ChaCha20Poly1305, 256);
        assert_eq!(suite.algorithm, Algorithm::ChaCha20Poly1305);
        assert_eq!(suite.max_skipped_keys, 256);
    }
}
