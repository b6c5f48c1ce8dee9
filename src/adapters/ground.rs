//! Ground-station side of the uplink.
//!
//! Signs commands with the shared secret and wraps them in KISS frames,
//! tracking the sequence number the spacecraft expects.  Used by the
//! simulator's `sign` mode and by tests.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};

use crate::config::SECRET_LEN;
use crate::link::auth::{SALT_LEN, sign_command};
use crate::link::kiss::{Encoded, FrameKind, encode_frame};

pub struct GroundStation {
    secret: [u8; SECRET_LEN],
    next_sequence: u32,
}

impl GroundStation {
    pub fn new(secret: [u8; SECRET_LEN], first_sequence: u32) -> Self {
        Self {
            secret,
            next_sequence: first_sequence,
        }
    }

    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    /// Sign `command` with a fresh salt and frame it for the uplink.
    pub fn uplink(&mut self, command: &str) -> Option<Encoded> {
        self.uplink_with_salt(command, &random_salt())
    }

    /// As [`uplink`](Self::uplink) with a caller-chosen salt.
    pub fn uplink_with_salt(&mut self, command: &str, salt: &[u8; SALT_LEN]) -> Option<Encoded> {
        let signed = sign_command(&self.secret, self.next_sequence, salt, command)?;
        let frame = encode_frame(FrameKind::Remote.type_byte(), signed.as_bytes(), true)?;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        Some(frame)
    }
}

/// Non-cryptographic salt for simulation; flight ground software uses an OS RNG.
pub fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    for chunk in salt.chunks_mut(8) {
        let val = RandomState::new().build_hasher().finish().to_le_bytes();
        chunk.copy_from_slice(&val[..chunk.len()]);
    }
    salt
}
