//! C10 — the fixed-layout wire header.
//!
//! Grounded on the original implementation's `packEncMessage`/
//! `unpackDecMessage`, which lay the header out as
//! `iv(12) || authTag(16) || senderPub(32) || receiverPub(32) ||
//! sendMsgNum(u32) || messageLength(u32)` ahead of the ciphertext body, and
//! guard the minimum package length with the literal comment
//! `12 (iv) + 16 (tag) + 32 (spk) + 32 (rpk) + 4 (num) + 4 (len)`. Per
//! spec.md §4.4/§9.2, none of these fields are bound as AEAD associated
//! data — the header is authenticated only by the ciphertext's own tag.

use arrayref::{array_ref, array_refs};

use crate::constants::{AEAD_IV_LENGTH, AEAD_TAG_LENGTH, CURVE25519_LENGTH, HEADER_LENGTH, MIN_PACKAGE_LENGTH};
use crate::error::CoreError;

/// The fixed fields carried ahead of every message's ciphertext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub iv: [u8; AEAD_IV_LENGTH],
    pub auth_tag: [u8; AEAD_TAG_LENGTH],
    pub sender_pub: [u8; CURVE25519_LENGTH],
    pub receiver_pub: [u8; CURVE25519_LENGTH],
    pub send_msg_num: u32,
    pub message_length: u32,
}

impl Header {
    /// Serializes the header to its fixed `HEADER_LENGTH`-byte form.
    pub fn pack(&self) -> [u8; HEADER_LENGTH] {
        let mut out = [0u8; HEADER_LENGTH];
        let mut offset = 0;
        out[offset..offset + AEAD_IV_LENGTH].copy_from_slice(&self.iv);
        offset += AEAD_IV_LENGTH;
        out[offset..offset + AEAD_TAG_LENGTH].copy_from_slice(&self.auth_tag);
        offset += AEAD_TAG_LENGTH;
        out[offset..offset + CURVE25519_LENGTH].copy_from_slice(&self.sender_pub);
        offset += CURVE25519_LENGTH;
        out[offset..offset + CURVE25519_LENGTH].copy_from_slice(&self.receiver_pub);
        offset += CURVE25519_LENGTH;
        out[offset..offset + 4].copy_from_slice(&self.send_msg_num.to_le_bytes());
        offset += 4;
        out[offset..offset + 4].copy_from_slice(&self.message_length.to_le_bytes());
        out
    }

    /// Parses a header from the first `HEADER_LENGTH` bytes of `bytes`.
    /// Rejects anything shorter than `MIN_PACKAGE_LENGTH`.
    pub fn unpack(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() < MIN_PACKAGE_LENGTH {
            return Err(CoreError::MalformedPackage);
        }
        let (iv, auth_tag, sender_pub, receiver_pub, send_msg_num, message_length) = array_refs![
            array_ref![bytes, 0, HEADER_LENGTH],
            AEAD_IV_LENGTH,
            AEAD_TAG_LENGTH,
            CURVE25519_LENGTH,
            CURVE25519_LENGTH,
            4,
            4
        ];
        Ok(Header {
            iv: *iv,
            auth_tag: *auth_tag,
            sender_pub: *sender_pub,
            receiver_pub: *receiver_pub,
            send_msg_num: u32::from_le_bytes(*send_msg_num),
            message_length: u32::from_le_bytes(*message_length),
        })
    }
}

/// Concatenates a packed header with its ciphertext body
/// (`packEncMessage`'s wire output).
pub fn pack_package(header: &Header, ciphertext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LENGTH + ciphertext.len());
    out.extend_from_slice(&header.pack());
    out.extend_from_slice(ciphertext);
    out
}

/// Splits a wire package into its header and ciphertext body
/// (`unpackDecMessage`'s input parsing). Validates that `message_length`
/// in the header matches the trailing byte count exactly.
pub fn unpack_package(bytes: &[u8]) -> Result<(Header, &[u8]), CoreError> {
    let header = Header::unpack(bytes)?;
    let ciphertext = &bytes[HEADER_LENGTH..];
    if ciphertext.len() as u64 != header.message_length as u64 {
        return Err(CoreError::MalformedPackage);
    }
    Ok((header, ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            iv: [0x11; AEAD_IV_LENGTH],
            auth_tag: [0x22; AEAD_TAG_LENGTH],
            sender_pub: [0x33; CURVE25519_LENGTH],
            receiver_pub: [0x44; CURVE25519_LENGTH],
            send_msg_num: 7,
            message_length: 13,
        }
    }

    #[test]
    fn pack_unpack_round_trip() {
        let header = sample_header();
        let packed = header.pack();
        let restored = Header::unpack(&packed).unwrap();
        assert_eq!(header, restored);
    }

    #[test]
    fn packed_length_is_normative() {
        assert_eq!(Header::unpack(&sample_header().pack()).unwrap().pack().len(), HEADER_LENGTH);
        assert_eq!(HEADER_LENGTH, 100);
    }

    #[test]
    fn package_round_trip_with_ciphertext() {
        let header = sample_header();
        let ciphertext = vec![0xABu8; header.message_length as usize];
        let package = pack_package(&header, &ciphertext);
        let (restored_header, restored_ciphertext) = unpack_package(&package).unwrap();
        assert_eq!(restored_header, header);
        assert_eq!(restored_ciphertext, ciphertext.as_slice());
    }

    #[test]
    fn rejects_package_shorter_than_minimum() {
        let result = Header::unpack(&[0u8; MIN_PACKAGE_LENGTH - 1]);
        assert!(matches!(result, Err(CoreError::MalformedPackage)));
    }

    #[test]
    fn rejects_mismatched_message_length() {
        let header = sample_header();
        let wrong_ciphertext = vec![0xABu8; header.message_length as usize + 1];
        let package = pack_package(&header, &wrong_ciphertext);
        let result = unpack_package(&package);
        assert!(matches!(result, Err(CoreError::MalformedPackage)));
    }
}
