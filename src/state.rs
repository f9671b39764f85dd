//! C8/C11 — `RatchetState`, the serializable snapshot of a session.
//!
//! Grounded on the original implementation's session persistence (the same
//! fields `DoubleRatchet` carries at runtime, flattened to bytes) and the
//! teacher's length-prefixed encoding idiom elsewhere in `utils.rs`. Field
//! order and shapes follow spec.md §3/§6 exactly: `own_priv`/`own_pub`,
//! `peer_pub`, `shared_secret`, `root_key`, `send_chain_key`/`recv_chain_key`,
//! the two counters, and the `message_keys` map are all carried even though,
//! per §9.1, the receive path only ever reads and advances `send_chain_key` —
//! `recv_chain_key` is written alongside it at every init/DH step and never
//! consulted again, exactly mirroring the preserved source behavior.

use std::collections::HashMap;

use zeroize::Zeroize;

use crate::constants::{CURVE25519_LENGTH, DEFAULT_MAX_SKIPPED_KEYS, SECRET_LENGTH};
use crate::error::CoreError;
use crate::keypair::KeyPair;

/// Which side of the session this snapshot belongs to. Only affects which
/// constructor in [`crate::ratchet::DoubleRatchet`] a restored state is fed
/// back into; the wire format itself is symmetric.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionRole {
    Initiator,
    Responder,
}

impl SessionRole {
    fn to_byte(self) -> u8 {
        match self {
            SessionRole::Initiator => 0,
            SessionRole::Responder => 1,
        }
    }

    fn from_byte(byte: u8) -> Result<Self, CoreError> {
        match byte {
            0 => Ok(SessionRole::Initiator),
            1 => Ok(SessionRole::Responder),
            _ => Err(CoreError::CorruptState("session_role byte out of range")),
        }
    }
}

/// The full state a `DoubleRatchet` needs to resume a session, independent
/// of any in-memory scratch buffers the active engine also holds.
pub struct RatchetState {
    pub session_role: SessionRole,
    pub self_keypair: KeyPair,
    pub peer_pub: Option<[u8; CURVE25519_LENGTH]>,
    pub shared_secret: [u8; SECRET_LENGTH],
    pub root_key: [u8; SECRET_LENGTH],
    pub send_chain_key: Option<[u8; SECRET_LENGTH]>,
    pub recv_chain_key: Option<[u8; SECRET_LENGTH]>,
    pub send_msg_num: u32,
    pub recv_msg_num: u32,
    pub message_keys: HashMap<u32, [u8; SECRET_LENGTH]>,
    pub max_skipped_keys: usize,
}

/// Same rationale as [`crate::ratchet::DoubleRatchet`]'s `Drop` impl: a
/// `HashMap`'s values aren't reached by `zeroize`'s derive macros, so the
/// secret slots are scrubbed by hand. `self_keypair` scrubs itself via its
/// own `Drop` impl; `peer_pub` is a public value and is left alone.
impl Drop for RatchetState {
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

impl RatchetState {
    /// Serializes the snapshot deterministically: fixed-width scalar fields
    /// in §3's order, then the `message_keys` map as a length-prefixed list
    /// of `seq(u32) || key(32)` entries (§6), in the iteration order of the
    /// backing `HashMap` (stable within one process run, not guaranteed
    /// across restores).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.session_role.to_byte());

        out.extend_from_slice(&self.self_keypair.private_bytes_raw());
        out.extend_from_slice(&self.self_keypair.public_bytes());

        push_optional_public(&mut out, self.peer_pub.as_ref());
        out.extend_from_slice(&self.shared_secret);
        out.extend_from_slice(&self.root_key);

        push_optional_secret(&mut out, self.send_chain_key.as_ref());
        push_optional_secret(&mut out, self.recv_chain_key.as_ref());

        out.extend_from_slice(&self.send_msg_num.to_le_bytes());
        out.extend_from_slice(&self.recv_msg_num.to_le_bytes());
        out.extend_from_slice(&(self.max_skipped_keys as u32).to_le_bytes());

        out.extend_from_slice(&(self.message_keys.len() as u32).to_le_bytes());
        for (seq, key) in &self.message_keys {
            out.extend_from_slice(&seq.to_le_bytes());
            out.extend_from_slice(key);
        }
        out
    }

    /// Parses a snapshot produced by [`RatchetState::to_bytes`], validating
    /// every declared length and bound against the remaining buffer before
    /// trusting it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut cursor = Cursor::new(bytes);

        let session_role = SessionRole::from_byte(cursor.take_byte()?)?;

        let private = cursor.take_slice(CURVE25519_LENGTH)?.to_vec();
        let public = cursor.take_array::<CURVE25519_LENGTH>()?;
        let self_keypair = KeyPair::load_raw(&private, &public)
            .map_err(|_| CoreError::CorruptState("self_keypair failed base_mult check"))?;

        let peer_pub = take_optional_public(&mut cursor)?;
        let shared_secret = cursor.take_array::<SECRET_LENGTH>()?;
        let root_key = cursor.take_array::<SECRET_LENGTH>()?;

        let send_chain_key = take_optional_secret(&mut cursor)?;
        let recv_chain_key = take_optional_secret(&mut cursor)?;

        let send_msg_num = cursor.take_u32()?;
        let recv_msg_num = cursor.take_u32()?;
        let max_skipped_keys = cursor.take_u32()? as usize;

        let entry_count = cursor.take_u32()? as usize;
        if entry_count > max_skipped_keys {
            return Err(CoreError::CorruptState("message_keys entry count exceeds its own bound"));
        }
        let mut message_keys = HashMap::with_capacity(entry_count);
        for _ in 0..entry_count {
            let seq = cursor.take_u32()?;
            let key = cursor.take_array::<SECRET_LENGTH>()?;
            message_keys.insert(seq, key);
        }
        cursor.expect_exhausted()?;

        Ok(RatchetState {
            session_role,
            self_keypair,
            peer_pub,
            shared_secret,
            root_key,
            send_chain_key,
            recv_chain_key,
            send_msg_num,
            recv_msg_num,
            message_keys,
            max_skipped_keys,
        })
    }
}

fn push_optional_secret(out: &mut Vec<u8>, value: Option<&[u8; SECRET_LENGTH]>) {
    match value {
        Some(v) => {
            out.push(1);
            out.extend_from_slice(v);
        }
        None => {
            out.push(0);
            out.extend_from_slice(&[0u8; SECRET_LENGTH]);
        }
    }
}

fn push_optional_public(out: &mut Vec<u8>, value: Option<&[u8; CURVE25519_LENGTH]>) {
    match value {
        Some(v) => {
            out.push(1);
            out.extend_from_slice(v);
        }
        None => {
            out.push(0);
            out.extend_from_slice(&[0u8; CURVE25519_LENGTH]);
        }
    }
}

fn take_optional_secret(cursor: &mut Cursor) -> Result<Option<[u8; SECRET_LENGTH]>, CoreError> {
    let present = cursor.take_byte()?;
    let value = cursor.take_array::<SECRET_LENGTH>()?;
    match present {
        0 => Ok(None),
        1 => Ok(Some(value)),
        _ => Err(CoreError::CorruptState("optional-secret presence byte out of range")),
    }
}

fn take_optional_public(cursor: &mut Cursor) -> Result<Option<[u8; CURVE25519_LENGTH]>, CoreError> {
    let present = cursor.take_byte()?;
    let value = cursor.take_array::<CURVE25519_LENGTH>()?;
    match present {
        0 => Ok(None),
        1 => Ok(Some(value)),
        _ => Err(CoreError::CorruptState("optional-public presence byte out of range")),
    }
}

/// A bounds-checked forward-only reader over a snapshot buffer.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Cursor { bytes, pos: 0 }
    }

    fn take_slice(&mut self, len: usize) -> Result<&'a [u8], CoreError> {
        if self.pos + len > self.bytes.len() {
            return Err(CoreError::CorruptState("snapshot ended before a fixed field"));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_byte(&mut self) -> Result<u8, CoreError> {
        Ok(self.take_slice(1)?[0])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let slice = self.take_slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn take_u32(&mut self) -> Result<u32, CoreError> {
        Ok(u32::from_le_bytes(self.take_array::<4>()?))
    }

    fn expect_exhausted(&self) -> Result<(), CoreError> {
        if self.pos != self.bytes.len() {
            return Err(CoreError::CorruptState("trailing bytes after parsing snapshot"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair::KeyPair;

    fn sample_state() -> RatchetState {
        let mut message_keys = HashMap::new();
        message_keys.insert(3, [0x02; SECRET_LENGTH]);
        message_keys.insert(4, [0x04; SECRET_LENGTH]);

        RatchetState {
            session_role: SessionRole::Initiator,
            self_keypair: KeyPair::generate(),
            peer_pub: Some([0xCC; CURVE25519_LENGTH]),
            shared_secret: [0xDD; SECRET_LENGTH],
            root_key: [0xAA; SECRET_LENGTH],
            send_chain_key: Some([0xBB; SECRET_LENGTH]),
            recv_chain_key: Some([0xBB; SECRET_LENGTH]),
            send_msg_num: 5,
            recv_msg_num: 6,
            message_keys,
            max_skipped_keys: DEFAULT_MAX_SKIPPED_KEYS,
        }
    }

    #[test]
    fn round_trip_preserves_scalars_and_map() {
        let state = sample_state();
        let self_public = state.self_keypair.public_bytes();
        let bytes = state.to_bytes();
        let restored = RatchetState::from_bytes(&bytes).unwrap();

        assert_eq!(restored.session_role, SessionRole::Initiator);
        assert_eq!(restored.root_key, state.root_key);
        assert_eq!(restored.shared_secret, state.shared_secret);
        assert_eq!(restored.send_chain_key, state.send_chain_key);
        assert_eq!(restored.recv_chain_key, state.recv_chain_key);
        assert_eq!(restored.self_keypair.public_bytes(), self_public);
        assert_eq!(restored.peer_pub, state.peer_pub);
        assert_eq!(restored.send_msg_num, 5);
        assert_eq!(restored.recv_msg_num, 6);
        assert_eq!(restored.message_keys, state.message_keys);
    }

    #[test]
    fn round_trip_with_no_chain_key_yet() {
        let mut state = sample_state();
        state.send_chain_key = None;
        state.recv_chain_key = None;
        state.peer_pub = None;
        let bytes = state.to_bytes();
        let restored = RatchetState::from_bytes(&bytes).unwrap();
        assert_eq!(restored.send_chain_key, None);
        assert_eq!(restored.recv_chain_key, None);
        assert_eq!(restored.peer_pub, None);
    }

    #[test]
    fn rejects_truncated_buffer() {
        let state = sample_state();
        let mut bytes = state.to_bytes();
        bytes.truncate(bytes.len() - 10);
        assert!(matches!(RatchetState::from_bytes(&bytes), Err(CoreError::CorruptState(_))));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let state = sample_state();
        let mut bytes = state.to_bytes();
        bytes.push(0xFF);
        assert!(matches!(RatchetState::from_bytes(&bytes), Err(CoreError::CorruptState(_))));
    }

    #[test]
    fn rejects_entry_count_exceeding_bound() {
        let state = sample_state();
        let mut bytes = state.to_bytes();
        let len = bytes.len();
        // message_keys.len() (u32 LE) sits immediately before the entries;
        // with two 36-byte entries (seq + key) trailing, it is 8 bytes before that.
        let count_offset = len - (2 * (4 + SECRET_LENGTH)) - 4;
        bytes[count_offset..count_offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(RatchetState::from_bytes(&bytes), Err(CoreError::CorruptState(_))));
    }

    /// A snapshot's own declared `max_skipped_keys` bound must be enforced
    /// directly, not loosened against `DEFAULT_MAX_SKIPPED_KEYS` — two
    /// entries (well under the 1,024 default) must still be rejected when
    /// the snapshot itself claims a bound of 1.
    #[test]
    fn rejects_entry_count_exceeding_its_own_smaller_bound() {
        let mut state = sample_state();
        state.max_skipped_keys = 1;
        let bytes = state.to_bytes();
        assert!(matches!(RatchetState::from_bytes(&bytes), Err(CoreError::CorruptState(_))));
    }
}
