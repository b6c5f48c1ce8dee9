//! Link configuration parameters
//!
//! Everything the command link needs at boot.  The flight build bakes in
//! the defaults; the host simulator can override them from a JSON file.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Length of the shared HMAC secret in bytes.
pub const SECRET_LEN: usize = 16;

/// Seven days, the window after which the spacecraft stops beaconing.
const SEVEN_DAYS_SECS: u32 = 7 * 24 * 60 * 60;

/// Core link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvionicsConfig {
    // --- Authentication ---
    /// Reject unsigned-looking or mis-signed commands instead of warning.
    pub validation_required: bool,
    /// Sequence number expected from the ground after boot.
    pub initial_sequence: u32,
    /// Shared secret for command HMACs.
    pub secret: [u8; SECRET_LEN],

    // --- Framing ---
    /// Escape FEND/FESC in outbound frames (false = legacy radio firmware).
    pub escape_outbound: bool,
    /// Abandon a partial frame after this many idle milliseconds (0 = never).
    pub frame_timeout_ms: u32,

    // --- Liveness ---
    /// Beaconing stops when no frame has arrived for this long.
    pub ground_contact_window_secs: u32,
    /// Radio replies relayed to the ground are cut to this many bytes.
    pub radio_response_limit: usize,
}

impl Default for AvionicsConfig {
    fn default() -> Self {
        Self {
            // Authentication
            validation_required: true,
            initial_sequence: 1,
            secret: *b"0123456789abcdef",

            // Framing
            escape_outbound: true,
            frame_timeout_ms: 5_000,

            // Liveness
            ground_contact_window_secs: SEVEN_DAYS_SECS,
            radio_response_limit: 191,
        }
    }
}

impl AvionicsConfig {
    /// Check the values are usable before the link is built from them.
    pub fn validate(&self) -> Result<(), Error> {
        if self.radio_response_limit == 0 {
            return Err(Error::Config("radio_response_limit must be non-zero"));
        }
        if self.radio_response_limit > crate::message::MAX_CONTENT_LEN {
            return Err(Error::Config("radio_response_limit exceeds message capacity"));
        }
        if self.ground_contact_window_secs == 0 {
            return Err(Error::Config("ground_contact_window_secs must be non-zero"));
        }
        if self.secret.iter().all(|&b| b == 0) {
            log::warn!("config: HMAC secret is all zeroes");
        }
        Ok(())
    }

    pub fn ground_contact_window_ms(&self) -> u64 {
        u64::from(self.ground_contact_window_secs) * 1_000
    }
}
