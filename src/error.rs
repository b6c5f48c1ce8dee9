//! Unified error types for the avionics command link.
//!
//! Each pipeline stage (framing, authentication, tokenising, command
//! construction) has its own small `Copy` enum.  None of these ever escape
//! a control-loop tick: the processor logs them, counts them, and carries
//! on.  [`Error`] covers what can stop the process before the loop starts.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Framing errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The byte after the opening FEND is neither Local nor Remote.
    InvalidType(u8),
    /// The payload grew past the fixed frame buffer.
    Overflow,
    /// FESC was followed by something other than TFEND / TFESC.
    InvalidEscape(u8),
    /// The frame closed before any payload byte arrived.
    Empty,
    /// A partial frame sat idle past the configured deadline.
    Timeout,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidType(b) => write!(f, "invalid frame type 0x{b:02X}"),
            Self::Overflow => write!(f, "frame buffer overflow"),
            Self::InvalidEscape(b) => write!(f, "invalid escape 0x{b:02X}"),
            Self::Empty => write!(f, "empty frame"),
            Self::Timeout => write!(f, "partial frame timed out"),
        }
    }
}

// ---------------------------------------------------------------------------
// Authentication errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// A signed envelope did not split into exactly four fields.
    Malformed { fields: usize },
    /// The sequence field is not a decimal number.
    SequenceNotNumeric,
    /// The sequence field is a number, but not the expected one.
    SequenceMismatch { expected: u32, received: u32 },
    /// The salt field is not 16 bytes of hex.
    MalformedSalt,
    /// The transmitted MAC does not match the computed one.
    BadMac,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { fields } => write!(f, "expected 4 fields, got {fields}"),
            Self::SequenceNotNumeric => write!(f, "sequence is not numeric"),
            Self::SequenceMismatch { expected, received } => {
                write!(f, "sequence mismatch (expected {expected}, got {received})")
            }
            Self::MalformedSalt => write!(f, "malformed salt"),
            Self::BadMac => write!(f, "HMAC mismatch"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tokeniser errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No tokens at all.
    Empty,
    /// More tokens than the parameter limit allows.
    TooManyTokens,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::TooManyTokens => write!(f, "too many tokens"),
        }
    }
}

// ---------------------------------------------------------------------------
// Command construction errors
// ---------------------------------------------------------------------------

/// Why a command came out `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Wrong number of arguments for the mnemonic.
    Arity { expected: usize, received: usize },
    /// An argument that must be all digits was not.
    NotDigits,
    /// A numeric argument does not fit its field.
    OutOfRange,
    /// ModifyMode takes exactly one character.
    BadMode,
    /// The frame or its tokens could not be read as a command at all.
    Unparseable,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arity { expected, received } => {
                write!(f, "expected {expected} arguments, got {received}")
            }
            Self::NotDigits => write!(f, "argument is not numeric"),
            Self::OutOfRange => write!(f, "argument out of range"),
            Self::BadMode => write!(f, "mode must be a single character"),
            Self::Unparseable => write!(f, "unparseable command"),
        }
    }
}

impl From<ParseError> for CommandError {
    fn from(_: ParseError) -> Self {
        Self::Unparseable
    }
}
