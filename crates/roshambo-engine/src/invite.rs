//! Invite token generation.
//!
//! A token is a short, URL-safe string a member can tap to join one
//! specific room. Tokens are random enough to not collide in practice,
//! and the generator re-rolls against the store until the uniqueness
//! constraint is confirmed. No long-term uncollision guarantee under
//! adversarial regeneration — acceptable at this token space and
//! volume.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::Rng;

use roshambo_model::{Identity, Room};
use roshambo_store::Store;

use crate::EngineError;

/// Generates a fresh token for `room`, persists it (replacing any
/// previous token for the room), and returns it.
pub(crate) async fn generate(store: &Store, room: &Room) -> Result<String, EngineError> {
    let mut rng = rand::rng();
    let token = loop {
        let candidate = encode(payload(room.owner, unix_millis(), rng.random()));
        if !store.invite_exists(&candidate).await? {
            break candidate;
        }
        tracing::debug!(room = %room, "invite token collision, regenerating");
    };
    store.replace_invite(room.owner, &room.name, &token).await?;
    tracing::info!(room = %room, "invite token generated");
    Ok(token)
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Packs the 9-byte little-endian token record: a 48-bit projection of
/// the owner identity (4 + 2 bytes), the millisecond-of-second
/// component of the clock (2 bytes, truncating), and one byte of
/// randomness.
fn payload(owner: Identity, unix_millis: u64, noise: u8) -> [u8; 9] {
    let projection =
        ((owner.participant_id ^ owner.context_id) | owner.participant_id) as u64;

    let mut bytes = [0u8; 9];
    bytes[..4].copy_from_slice(&((projection & 0xffff_ffff) as u32).to_le_bytes());
    bytes[4..6].copy_from_slice(&(((projection >> 32) & 0xffff) as u16).to_le_bytes());
    bytes[6..8].copy_from_slice(&((unix_millis % 100_000) as u16).to_le_bytes());
    bytes[8] = noise;
    bytes
}

/// Base64url-encodes the record, then substitutes the two characters
/// that are awkward in chat links and file names. 9 bytes encode to
/// exactly 12 characters, so no padding is involved.
fn encode(payload: [u8; 9]) -> String {
    URL_SAFE_NO_PAD
        .encode(payload)
        .replace('-', "AA")
        .replace('_', "bb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_deterministic() {
        let owner = Identity::new(0x1234_5678_9abc, 0x42);
        assert_eq!(payload(owner, 1000, 7), payload(owner, 1000, 7));
        assert_ne!(payload(owner, 1000, 7), payload(owner, 1000, 8));
    }

    #[test]
    fn test_payload_packs_projection_little_endian() {
        // projection = (1 ^ 0) | 1 = 1 → first four bytes 01 00 00 00
        let bytes = payload(Identity::new(1, 0), 0, 0);
        assert_eq!(&bytes[..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[4..6], &[0, 0]);
        assert_eq!(&bytes[6..8], &[0, 0]);
        assert_eq!(bytes[8], 0);
    }

    #[test]
    fn test_payload_clock_component_wraps() {
        let owner = Identity::new(5, 5);
        // Same value modulo 100000 packs identically.
        assert_eq!(payload(owner, 12_345, 0), payload(owner, 112_345, 0));
    }

    #[test]
    fn test_encode_emits_no_reserved_characters() {
        // Exhaust the substitution paths with bytes that base64url maps
        // to '-' (0xf8..) and '_' (0xfc..).
        for probe in [[0xffu8; 9], [0xf8; 9], [0u8; 9], [0x3e; 9]] {
            let token = encode(probe);
            assert!(
                token.chars().all(|c| c.is_ascii_alphanumeric()),
                "token {token:?} contains a reserved character"
            );
        }
    }

    #[test]
    fn test_encode_length_is_stable() {
        // 12 chars before substitution; each substitution adds one.
        let token = encode([0u8; 9]);
        assert!(token.len() >= 12);
    }
}
