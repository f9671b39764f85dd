//! C3 — BLAKE2b-512 / BLAKE2s-256 digests.
//!
//! Grounded on the original implementation's `HashingEnv`/`Blake2` facade
//! (algorithm-tagged hashing), generalized to both BLAKE2 variants named in
//! spec.md's data model.

use blake2::{Blake2b512, Blake2s256, Digest};

use crate::constants::{BLAKE2B_LENGTH, BLAKE2S_LENGTH};

/// Selects which BLAKE2 variant [`digest`] computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// 64-byte digest.
    Blake2b512,
    /// 32-byte digest.
    Blake2s256,
}

impl HashAlgorithm {
    /// The output length this algorithm produces.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Blake2b512 => BLAKE2B_LENGTH,
            HashAlgorithm::Blake2s256 => BLAKE2S_LENGTH,
        }
    }
}

/// Computes the digest of `input` under `algo`. Deterministic, side-effect-free.
pub fn digest(algo: HashAlgorithm, input: &[u8]) -> Vec<u8> {
    match algo {
        HashAlgorithm::Blake2b512 => Blake2b512::digest(input).to_vec(),
        HashAlgorithm::Blake2s256 => Blake2s256::digest(input).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_output_length() {
        let out = digest(HashAlgorithm::Blake2b512, b"hello world");
        assert_eq!(out.len(), BLAKE2B_LENGTH);
    }

    #[test]
    fn blake2s_output_length() {
        let out = digest(HashAlgorithm::Blake2s256, b"hello world");
        assert_eq!(out.len(), BLAKE2S_LENGTH);
    }

    #[test]
    fn deterministic() {
        let a = digest(HashAlgorithm::Blake2b512, b"same input");
        let b = digest(HashAlgorithm::Blake2b512, b"same input");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_inputs_distinct_digests() {
        let a = digest(HashAlgorithm::Blake2s256, b"input a");
        let b = digest(HashAlgorithm::Blake2s256, b"input b");
        assert_ne!(a, b);
    }
}
