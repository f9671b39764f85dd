//! C9 — `DoubleRatchet`, the session state machine.
//!
//! Grounded directly on the original implementation's `DoubleRatchet` class
//! (`ConstructType::INIT`/`FOLLOWINIT`/`EXISTING`, `initNewSession`/
//! `initRootChain`, `symmetricRatchetStep`/`receiveSymmetricRatchetStep`,
//! `packEncMessage`/`unpackDecMessage`, and the header-comparison trigger for
//! `asymmetricRatchetStep`). Several behaviors that look like bugs are
//! carried forward unchanged because the original implementation behaves
//! this way and nothing in this crate's scope licenses "fixing" them:
//!
//! - there is one chain key, `send_chain_key`; the receive path steps it
//!   under the same `"SendChainStep"` label the send path uses, rather than
//!   keeping an independent receive chain (`recv_chain_key` is carried in
//!   the state purely because the source's struct has the field — it is
//!   written at every init/DH step and never read again).
//! - `asymmetric_ratchet_step` always generates a fresh own keypair, even on
//!   the very first transition a long-running session takes after a peer
//!   reappears under a different public key. The original's own test suite
//!   never exercises this path with a genuine two-sided resync, and doing so
//!   here confirms the same thing the source's author apparently never
//!   noticed: a peer that reappears under a brand-new identity (rather than
//!   ratcheting the *existing* session forward) cannot be decrypted, because
//!   the two sides end up deriving unrelated root keys. This is preserved as
//!   specified rather than silently repaired.
//! - skipped message keys are dropped whenever a DH ratchet step occurs —
//!   they are not carried across into the new chain.

use std::collections::HashMap;

use log::{debug, trace};
use zeroize::Zeroize;

use crate::aead::Algorithm;
use crate::config::CipherSuite;
use crate::constants::{
    AEAD_IV_LENGTH, AEAD_KEY_LENGTH, CURVE25519_LENGTH, INITIAL_ROOT_SALT,
    LABEL_DH_RATCHET_UPDATE, LABEL_INITIAL_ROOT_KEY, LABEL_SEND_CHAIN_STEP, SECRET_LENGTH,
};
use crate::encryption_env::EncryptionEnv;
use crate::error::CoreError;
use crate::header::{pack_package, unpack_package, Header};
use crate::kdf::kdf;
use crate::key_env::KeyEnv;
use crate::keypair::KeyPair;
use crate::state::{RatchetState, SessionRole};

/// A live Double Ratchet session between this party and one peer.
pub struct DoubleRatchet {
    algo: Algorithm,
    role: SessionRole,
    self_keypair: KeyPair,
    peer_pub: Option<[u8; CURVE25519_LENGTH]>,
    shared_secret: [u8; SECRET_LENGTH],
    root_key: [u8; SECRET_LENGTH],
    send_chain_key: Option<[u8; SECRET_LENGTH]>,
    recv_chain_key: Option<[u8; SECRET_LENGTH]>,
    send_msg_num: u32,
    recv_msg_num: u32,
    message_keys: HashMap<u32, [u8; SECRET_LENGTH]>,
    max_skipped_keys: usize,
}

/// `zeroize`'s derive macros don't reach into a `HashMap`'s values, so the
/// secret-bearing fields are scrubbed by hand here rather than with
/// `#[derive(ZeroizeOnDrop)]` (the idiom `self_keypair`'s own `KeyPair`
/// already uses, see `src/keypair.rs`). `self_keypair` scrubs itself via its
/// own `Drop` impl once this struct's fields are dropped in turn; `peer_pub`
/// is a public value and is left alone.
impl Drop for DoubleRatchet {
    fn drop(&mut self) {
        self.shared_secret.zeroize();
        self.root_key.zeroize();
        self.send_chain_key.zeroize();
        self.recv_chain_key.zeroize();
        for message_key in self.message_keys.values_mut() {
            message_key.zeroize();
        }
        self.message_keys.clear();
    }
}

impl DoubleRatchet {
    /// Starts a session as the initiating party, who already has the peer's
    /// current public key (`ConstructType::INIT`). Generates a fresh own
    /// keypair and immediately runs `initNewSession` against `peer_pub`.
    pub fn init(peer_pub: [u8; CURVE25519_LENGTH], suite: CipherSuite) -> Result<Self, CoreError> {
        let mut engine = DoubleRatchet {
            algo: suite.algorithm,
            role: SessionRole::Initiator,
            self_keypair: KeyPair::generate(),
            peer_pub: None,
            shared_secret: [0u8; SECRET_LENGTH],
            root_key: [0u8; SECRET_LENGTH],
            send_chain_key: None,
            recv_chain_key: None,
            send_msg_num: 0,
            recv_msg_num: 0,
            message_keys: HashMap::new(),
            max_skipped_keys: suite.max_skipped_keys,
        };
        engine.init_new_session(peer_pub)?;
        debug!("ratchet initialized as initiator");
        Ok(engine)
    }

    /// Starts a session as the responding party, adopting a caller-supplied
    /// X25519 keypair whose public half was already advertised to the peer
    /// (`ConstructType::FOLLOWINIT`). Runs the same `initNewSession` as
    /// [`DoubleRatchet::init`], against the own keypair supplied here rather
    /// than a freshly generated one.
    pub fn follow_init(
        self_keypair: KeyPair,
        peer_pub: [u8; CURVE25519_LENGTH],
        suite: CipherSuite,
    ) -> Result<Self, CoreError> {
        let mut engine = DoubleRatchet {
            algo: suite.algorithm,
            role: SessionRole::Responder,
            self_keypair,
            peer_pub: None,
            shared_secret: [0u8; SECRET_LENGTH],
            root_key: [0u8; SECRET_LENGTH],
            send_chain_key: None,
            recv_chain_key: None,
            send_msg_num: 0,
            recv_msg_num: 0,
            message_keys: HashMap::new(),
            max_skipped_keys: suite.max_skipped_keys,
        };
        engine.init_new_session(peer_pub)?;
        debug!("ratchet initialized as responder");
        Ok(engine)
    }

    /// Resumes a session from a previously saved [`RatchetState`]
    /// (`ConstructType::EXISTING`). The state's own `max_skipped_keys` bound
    /// (as set at the time of the snapshot) is kept; `suite.max_skipped_keys`
    /// is ignored in favor of it, but `suite.algorithm` selects which AEAD
    /// primitive the resumed session uses.
    pub fn existing(state: RatchetState, suite: CipherSuite) -> Self {
        DoubleRatchet {
            algo: suite.algorithm,
            role: state.session_role,
            self_keypair: state.self_keypair,
            peer_pub: state.peer_pub,
            shared_secret: state.shared_secret,
            root_key: state.root_key,
            send_chain_key: state.send_chain_key,
            recv_chain_key: state.recv_chain_key,
            send_msg_num: state.send_msg_num,
            recv_msg_num: state.recv_msg_num,
            message_keys: state.message_keys,
            max_skipped_keys: state.max_skipped_keys,
        }
    }

    /// Snapshots the current session into a [`RatchetState`] suitable for
    /// [`RatchetState::to_bytes`].
    pub fn to_state(&self) -> RatchetState {
        RatchetState {
            session_role: self.role,
            self_keypair: self.self_keypair.clone(),
            peer_pub: self.peer_pub,
            shared_secret: self.shared_secret,
            root_key: self.root_key,
            send_chain_key: self.send_chain_key,
            recv_chain_key: self.recv_chain_key,
            send_msg_num: self.send_msg_num,
            recv_msg_num: self.recv_msg_num,
            message_keys: self.message_keys.clone(),
            max_skipped_keys: self.max_skipped_keys,
        }
    }

    /// Overrides the default 1024-entry bound on retained skipped keys.
    pub fn set_max_skipped_keys(&mut self, bound: usize) {
        self.max_skipped_keys = bound;
    }

    /// This side's current public key, for handing to the peer out of band.
    pub fn self_public_key(&self) -> [u8; CURVE25519_LENGTH] {
        self.self_keypair.public_bytes()
    }

    /// `initNewSession`: derives the shared secret against `peer_pub` using
    /// the current own keypair, then `initRootChain` — the initial root key
    /// and both (equal) chain keys — from that shared secret.
    fn init_new_session(&mut self, peer_pub: [u8; CURVE25519_LENGTH]) -> Result<(), CoreError> {
        let shared = self.self_keypair.diffie_hellman(&peer_pub)?;
        self.peer_pub = Some(peer_pub);
        self.shared_secret = shared;

        let derived = kdf(&self.shared_secret, &INITIAL_ROOT_SALT, LABEL_INITIAL_ROOT_KEY, SECRET_LENGTH)?;
        let mut root_key = [0u8; SECRET_LENGTH];
        root_key.copy_from_slice(&derived);

        self.root_key = root_key;
        self.send_chain_key = Some(root_key);
        self.recv_chain_key = Some(root_key);
        self.send_msg_num = 0;
        self.recv_msg_num = 0;
        self.message_keys.clear();
        Ok(())
    }

    /// Encrypts `plaintext` into a complete wire package: header followed
    /// immediately by ciphertext (`packEncMessage`).
    pub fn pack_enc_message(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CoreError> {
        let sender_pub = self.self_keypair.public_bytes();
        let receiver_pub = self
            .peer_pub
            .ok_or(CoreError::PreconditionError("no peer public key established yet"))?;

        let send_msg_num = self.send_msg_num;
        let message_key = self.symmetric_ratchet_step()?;

        // The original draws a full (key, iv) pair here via its KeyEnv(KeyIv)
        // facade and only ever reads the iv back — the message key always
        // comes from the chain, so the generated key is discarded unused.
        let mut iv_env = KeyEnv::key_iv(AEAD_KEY_LENGTH, AEAD_IV_LENGTH);
        iv_env.generate()?;
        let mut iv = [0u8; AEAD_IV_LENGTH];
        iv.copy_from_slice(iv_env.iv()?);

        let mut enc_env = EncryptionEnv::new(self.algo);
        enc_env.set_key_iv(&message_key, &iv)?;
        enc_env.start_encryption(plaintext)?;
        let ciphertext = enc_env.ciphertext()?.to_vec();
        let tag = *enc_env.auth_tag()?;

        let header = Header {
            iv,
            auth_tag: tag,
            sender_pub,
            receiver_pub,
            send_msg_num,
            message_length: ciphertext.len() as u32,
        };
        trace!("packed message {send_msg_num} ({} ciphertext bytes)", ciphertext.len());
        Ok(pack_package(&header, &ciphertext))
    }

    /// Decrypts a complete wire package, triggering a DH ratchet step first
    /// if the header's sender key differs from the currently recorded peer
    /// key (`unpackDecMessage`).
    pub fn unpack_dec_message(&mut self, package: &[u8]) -> Result<Vec<u8>, CoreError> {
        let (header, ciphertext) = unpack_package(package)?;

        if self.peer_pub != Some(header.sender_pub) {
            debug!("peer public key changed, performing DH ratchet step");
            self.asymmetric_ratchet_step(header.sender_pub)?;
        }

        let message_key = self.obtain_message_key(header.send_msg_num)?;
        let mut enc_env = EncryptionEnv::new(self.algo);
        enc_env.set_key_iv(&message_key, &header.iv)?;
        enc_env.start_decryption(ciphertext, &header.auth_tag)?;
        let plaintext = enc_env.plaintext()?.to_vec();
        trace!("unpacked message {}", header.send_msg_num);
        Ok(plaintext)
    }

    /// One step of `sendChainKey`, salted with the session's `sharedSecret`
    /// (spec.md §4.2's KDF call-site table), shared verbatim by the send
    /// path and the lazy receive-side derivation per the preserved
    /// single-chain behavior.
    fn step_chain(&mut self) -> Result<[u8; SECRET_LENGTH], CoreError> {
        let current = self
            .send_chain_key
            .ok_or(CoreError::PreconditionError("no send chain established yet"))?;
        let okm = kdf(&current, &self.shared_secret, LABEL_SEND_CHAIN_STEP, SECRET_LENGTH * 2)?;
        let (new_chain, message_key) = okm.split_at(SECRET_LENGTH);

        let mut next_chain = [0u8; SECRET_LENGTH];
        next_chain.copy_from_slice(new_chain);
        self.send_chain_key = Some(next_chain);

        let mut key = [0u8; SECRET_LENGTH];
        key.copy_from_slice(message_key);
        Ok(key)
    }

    /// `symmetricRatchetStep`: advances the chain, stores the derived key
    /// under the current `sendMsgNum`, then immediately reclaims it for use
    /// — matching the source's store-then-read-back shape while honoring
    /// the single-use/"consumed" contract spec.md's glossary states for
    /// message keys.
    fn symmetric_ratchet_step(&mut self) -> Result<[u8; SECRET_LENGTH], CoreError> {
        let seq = self.send_msg_num;
        let key = self.step_chain()?;
        self.insert_message_key(seq, key);
        self.send_msg_num += 1;
        self.message_keys
            .remove(&seq)
            .ok_or(CoreError::Internal("message key missing immediately after derivation"))
    }

    /// Inserts a derived key, evicting the lowest sequence number present
    /// once the bound is reached (spec.md §9, open question 6).
    fn insert_message_key(&mut self, seq: u32, key: [u8; SECRET_LENGTH]) {
        if self.message_keys.len() >= self.max_skipped_keys && !self.message_keys.contains_key(&seq) {
            if let Some(&oldest) = self.message_keys.keys().min() {
                self.message_keys.remove(&oldest);
            }
        }
        self.message_keys.insert(seq, key);
    }

    /// Returns the message key for `msg_num`, deriving and caching any keys
    /// for lower sequence numbers not yet reached (`receiveSymmetricRatchetStep`,
    /// generalized per spec.md §5's lazy skipped-key derivation).
    fn obtain_message_key(&mut self, msg_num: u32) -> Result<[u8; SECRET_LENGTH], CoreError> {
        if let Some(key) = self.message_keys.remove(&msg_num) {
            return Ok(key);
        }
        if msg_num < self.recv_msg_num {
            return Err(CoreError::Internal("message key for an already-consumed sequence number"));
        }
        let gap = (msg_num - self.recv_msg_num) as usize;
        if gap > self.max_skipped_keys {
            return Err(CoreError::MaxSkipsExceeded);
        }
        while self.recv_msg_num < msg_num {
            let seq = self.recv_msg_num;
            let skipped_key = self.step_chain()?;
            self.insert_message_key(seq, skipped_key);
            self.recv_msg_num += 1;
        }
        let key = self.step_chain()?;
        self.recv_msg_num += 1;
        Ok(key)
    }

    /// `asymmetricRatchetStep`: generates a new own keypair unconditionally,
    /// adopts `new_peer_pub`, and rekeys the root from the fresh shared
    /// secret — the 32-byte "DH-Ratchet-Update" output becomes the new root
    /// key directly, and both chain keys are set equal to it (spec.md §4.2's
    /// KDF call-site table; no second KDF call derives the chain keys).
    fn asymmetric_ratchet_step(&mut self, new_peer_pub: [u8; CURVE25519_LENGTH]) -> Result<(), CoreError> {
        self.self_keypair = KeyPair::generate();
        self.peer_pub = Some(new_peer_pub);
        self.shared_secret = self.self_keypair.diffie_hellman(&new_peer_pub)?;

        let derived = kdf(&self.root_key, &self.shared_secret, LABEL_DH_RATCHET_UPDATE, SECRET_LENGTH)?;
        self.root_key.copy_from_slice(&derived);
        self.send_chain_key = Some(self.root_key);
        self.recv_chain_key = Some(self.root_key);

        self.send_msg_num = 0;
        self.recv_msg_num = 0;
        self.message_keys.clear();
        trace!("DH ratchet step complete, root key updated");
        Ok(())
    }
}
