//! Command authentication: sequence-numbered, salted HMAC-BLAKE2s.
//!
//! A signed uplink command looks like
//!
//! ```text
//! <sequence>|<salt: 32 hex>|<command text>|<mac: 64 lower-case hex>
//! ```
//!
//! where `mac = HMAC-BLAKE2s-256(secret, sequence ‖ "|" ‖ salt ‖ "|" ‖ command)`
//! and the salt enters the MAC as its 16 decoded bytes.  Text with no `|`
//! at all is an unsigned command and passes straight through.
//!
//! With `validation_required` off (bench testing) every check only warns.
//! The expected sequence number advances only when a frame carried exactly
//! that number and was accepted, so a forged frame cannot consume it.

use blake2::Blake2s256;
use hmac::{Mac, SimpleHmac};
use log::{debug, error, warn};

use crate::config::{AvionicsConfig, SECRET_LEN};
use crate::error::AuthError;

type HmacBlake2s = SimpleHmac<Blake2s256>;

// ── Constants ────────────────────────────────────────────────

/// Field separator of a signed command.
pub const SEPARATOR: char = '|';
/// Number of fields in a signed command.
pub const FIELD_COUNT: usize = 4;
/// Longest accepted sequence field.
pub const MAX_SEQUENCE_DIGITS: usize = 10;
/// Salt length in bytes (twice that in hex).
pub const SALT_LEN: usize = 16;
/// MAC length in bytes (twice that in hex).
pub const MAC_LEN: usize = 32;

/// Capacity of a ground-side signed envelope.
pub const MAX_SIGNED_LEN: usize = 256;

// ── Sequence counter ─────────────────────────────────────────

/// Next sequence number the ground must use.  Resets on reboot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter {
    expected: u32,
}

impl SequenceCounter {
    pub fn new(initial: u32) -> Self {
        Self { expected: initial }
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    fn advance(&mut self) {
        self.expected = self.expected.wrapping_add(1);
    }
}

// ── Validator ────────────────────────────────────────────────

/// A command that passed (or was allowed past) authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated<'a> {
    /// The command text, without envelope.
    pub command: &'a str,
    /// Sequence number to acknowledge.
    pub sequence: u32,
    /// Whether the command came in a signed envelope.
    pub signed: bool,
}

pub struct SignatureValidator {
    secret: [u8; SECRET_LEN],
    validation_required: bool,
    sequence: SequenceCounter,
}

impl SignatureValidator {
    pub fn new(secret: [u8; SECRET_LEN], validation_required: bool, initial_sequence: u32) -> Self {
        Self {
            secret,
            validation_required,
            sequence: SequenceCounter::new(initial_sequence),
        }
    }

    pub fn from_config(config: &AvionicsConfig) -> Self {
        Self::new(
            config.secret,
            config.validation_required,
            config.initial_sequence,
        )
    }

    pub fn expected_sequence(&self) -> u32 {
        self.sequence.expected()
    }

    pub fn validation_required(&self) -> bool {
        self.validation_required
    }

    /// Strip and check the signature envelope around a command.
    pub fn validate<'a>(&mut self, buffer: &'a str) -> Result<Authenticated<'a>, AuthError> {
        let buffer = buffer.trim();

        if !buffer.contains(SEPARATOR) {
            debug!("auth: command is not signed");
            return Ok(Authenticated {
                command: buffer,
                sequence: self.sequence.expected(),
                signed: false,
            });
        }

        let count = buffer.split(SEPARATOR).count();
        let mut fields = buffer.split(SEPARATOR);
        let (Some(seq_text), Some(salt_hex), Some(command), Some(mac_hex), FIELD_COUNT) =
            (fields.next(), fields.next(), fields.next(), fields.next(), count)
        else {
            error!("auth: signed command has {count} fields");
            return Err(AuthError::Malformed { fields: count });
        };

        // Sequence.
        let expected = self.sequence.expected();
        let received = parse_sequence(seq_text);
        let sequence_ok = match received {
            Some(n) if n == expected => true,
            Some(n) => {
                self.check(AuthError::SequenceMismatch {
                    expected,
                    received: n,
                })?;
                false
            }
            None => {
                self.check(AuthError::SequenceNotNumeric)?;
                false
            }
        };

        // Salt and MAC.
        let mut salt = [0u8; SALT_LEN];
        if hex::decode_to_slice(salt_hex, &mut salt).is_err() {
            self.check(AuthError::MalformedSalt)?;
        } else if !verify_mac(&self.secret, seq_text, &salt, command, mac_hex) {
            self.check(AuthError::BadMac)?;
        } else {
            debug!("auth: command signature valid");
        }

        if sequence_ok {
            self.sequence.advance();
        }

        Ok(Authenticated {
            command,
            sequence: received.unwrap_or(expected),
            signed: true,
        })
    }

    /// Fail hard, or log and let the command through in bench mode.
    fn check(&self, failure: AuthError) -> Result<(), AuthError> {
        if self.validation_required {
            error!("auth: {failure}");
            Err(failure)
        } else {
            warn!("auth: {failure} (validation not required)");
            Ok(())
        }
    }
}

fn parse_sequence(text: &str) -> Option<u32> {
    if text.is_empty()
        || text.len() > MAX_SEQUENCE_DIGITS
        || !text.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    text.parse().ok()
}

fn keyed_mac(
    secret: &[u8; SECRET_LEN],
    sequence: &str,
    salt: &[u8; SALT_LEN],
    command: &str,
) -> Option<HmacBlake2s> {
    let mut mac = <HmacBlake2s as Mac>::new_from_slice(secret).ok()?;
    let mut separator = [0u8; 4];
    let separator = SEPARATOR.encode_utf8(&mut separator).as_bytes();
    mac.update(sequence.as_bytes());
    mac.update(separator);
    mac.update(salt);
    mac.update(separator);
    mac.update(command.as_bytes());
    Some(mac)
}

/// The transmitted MAC must be exactly 64 lower-case hex digits.
fn verify_mac(
    secret: &[u8; SECRET_LEN],
    sequence: &str,
    salt: &[u8; SALT_LEN],
    command: &str,
    mac_hex: &str,
) -> bool {
    if mac_hex.len() != 2 * MAC_LEN
        || !mac_hex
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }
    let mut tag = [0u8; MAC_LEN];
    if hex::decode_to_slice(mac_hex, &mut tag).is_err() {
        return false;
    }
    keyed_mac(secret, sequence, salt, command)
        .is_some_and(|mac| mac.verify_slice(&tag).is_ok())
}

// ── Ground-side signing (simulator, tests, fuzzing) ──────────

/// Compute the raw MAC for a command.
pub fn compute_mac(
    secret: &[u8; SECRET_LEN],
    sequence: &str,
    salt: &[u8; SALT_LEN],
    command: &str,
) -> Option<[u8; MAC_LEN]> {
    let mac = keyed_mac(secret, sequence, salt, command)?;
    Some(mac.finalize().into_bytes().into())
}

/// Build a complete signed envelope, as the ground station would.
///
/// Returns `None` if the command is too long for the envelope buffer.
pub fn sign_command(
    secret: &[u8; SECRET_LEN],
    sequence: u32,
    salt: &[u8; SALT_LEN],
    command: &str,
) -> Option<heapless::String<MAX_SIGNED_LEN>> {
    use core::fmt::Write as _;

    let mut seq_text: heapless::String<MAX_SEQUENCE_DIGITS> = heapless::String::new();
    write!(seq_text, "{sequence}").ok()?;

    let mut salt_hex = [0u8; 2 * SALT_LEN];
    hex::encode_to_slice(salt, &mut salt_hex).ok()?;
    let mut mac_hex = [0u8; 2 * MAC_LEN];
    hex::encode_to_slice(compute_mac(secret, &seq_text, salt, command)?, &mut mac_hex).ok()?;

    let mut out = heapless::String::new();
    write!(
        out,
        "{seq_text}{SEPARATOR}{}{SEPARATOR}{command}{SEPARATOR}{}",
        core::str::from_utf8(&salt_hex).ok()?,
        core::str::from_utf8(&mac_hex).ok()?,
    )
    .ok()?;
    Some(out)
}

// ── Tests ────────────────────────────────────────────────────
