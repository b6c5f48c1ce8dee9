//! KISS frame codec.
//!
//! Wire format:
//! ```text
//! ┌──────┬───────────┬──────────────────────────┬──────┐
//! │ FEND │ Type (1B) │ Escaped payload (≤256 B) │ FEND │
//! │ 0xC0 │ 00 | AA   │                          │ 0xC0 │
//! └──────┴───────────┴──────────────────────────┴──────┘
//! ```
//!
//! Inside a frame, a literal `0xC0` travels as `DB DC` and a literal
//! `0xDB` as `DB DD`.  The same [`escape`]/[`unescape`] pair is used on
//! the way out and on the way in.
//!
//! The decoder is fed one byte at a time from the serial port, so a frame
//! may straddle any number of control-loop ticks.

use log::{trace, warn};

use crate::error::FrameError;

/// Frame delimiter.
pub const FEND: u8 = 0xC0;
/// Escape introducer.
pub const FESC: u8 = 0xDB;
/// Escaped FEND.
pub const TFEND: u8 = 0xDC;
/// Escaped FESC.
pub const TFESC: u8 = 0xDD;

/// Maximum payload size of an inbound frame.
pub const MAX_FRAME_LEN: usize = 256;

/// Worst-case encoded size: two delimiters plus every byte escaped.
pub const MAX_ENCODED_LEN: usize = 2 + 2 * (1 + crate::message::MAX_CONTENT_LEN);

/// Frame payload storage.
pub type Payload = heapless::Vec<u8, MAX_FRAME_LEN>;

// ── Frame ────────────────────────────────────────────────────

/// Who a frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// The radio board on the local bus.
    Local,
    /// The ground station, relayed by the radio.
    Remote,
}

impl FrameKind {
    pub const fn type_byte(self) -> u8 {
        match self {
            Self::Local => 0x00,
            Self::Remote => 0xAA,
        }
    }

    pub const fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Local),
            0xAA => Some(Self::Remote),
            _ => None,
        }
    }
}

/// One complete, unescaped inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Payload,
}

// ── Escaping ─────────────────────────────────────────────────

/// Escape one byte for transmission inside a frame.
///
/// Returns the one or two bytes that represent `byte` on the wire.
pub fn escape(byte: u8) -> ([u8; 2], usize) {
    match byte {
        FEND => ([FESC, TFEND], 2),
        FESC => ([FESC, TFESC], 2),
        b => ([b, 0], 1),
    }
}

/// Resolve the byte following a FESC.  `None` for an illegal escape.
pub const fn unescape(byte: u8) -> Option<u8> {
    match byte {
        TFEND => Some(FEND),
        TFESC => Some(FESC),
        _ => None,
    }
}

// ── Decoder ──────────────────────────────────────────────────

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Outside any frame, waiting for FEND.
    Idle,
    /// FEND seen, the next byte is the frame type.
    TypeByte,
    /// Accumulating payload bytes.
    Payload(FrameKind),
    /// FESC seen inside the payload.
    Escape(FrameKind),
}

/// Streaming KISS decoder.
pub struct FrameDecoder {
    state: DecoderState,
    buffer: Payload,
    /// Partial frames idle longer than this are dropped; 0 disables.
    timeout_ms: u64,
    last_byte_ms: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_timeout(0)
    }

    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            state: DecoderState::Idle,
            buffer: Payload::new(),
            timeout_ms,
            last_byte_ms: 0,
        }
    }

    /// Feed one byte received at `now_ms`.
    ///
    /// Returns `Ok(Some(frame))` when the byte closes a frame and
    /// `Err(_)` when the current frame has been abandoned.  After an error
    /// the decoder is already resynchronised; the caller only logs it.
    pub fn feed_byte(&mut self, byte: u8, now_ms: u64) -> Result<Option<Frame>, FrameError> {
        let stale = self.in_frame()
            && self.timeout_ms > 0
            && now_ms.saturating_sub(self.last_byte_ms) > self.timeout_ms;
        self.last_byte_ms = now_ms;

        if stale {
            self.reset();
            // A FEND arriving late still opens the next frame.
            if byte == FEND {
                self.state = DecoderState::TypeByte;
            }
            return Err(FrameError::Timeout);
        }

        match self.state {
            DecoderState::Idle => {
                if byte == FEND {
                    self.state = DecoderState::TypeByte;
                } else {
                    trace!("KISS: ignoring 0x{byte:02X} outside frame");
                }
                Ok(None)
            }

            DecoderState::TypeByte => {
                if byte == FEND {
                    // Back-to-back FENDs are fill.
                    return Ok(None);
                }
                match FrameKind::from_type_byte(byte) {
                    Some(kind) => {
                        self.buffer.clear();
                        self.state = DecoderState::Payload(kind);
                        Ok(None)
                    }
                    None => {
                        self.reset();
                        Err(FrameError::InvalidType(byte))
                    }
                }
            }

            DecoderState::Payload(kind) => match byte {
                FEND => {
                    // The closing FEND doubles as the next opening FEND.
                    self.state = DecoderState::TypeByte;
                    if self.buffer.is_empty() {
                        return Err(FrameError::Empty);
                    }
                    let payload = core::mem::take(&mut self.buffer);
                    Ok(Some(Frame { kind, payload }))
                }
                FESC => {
                    self.state = DecoderState::Escape(kind);
                    Ok(None)
                }
                b => self.push(b, kind),
            },

            DecoderState::Escape(kind) => match unescape(byte) {
                Some(b) => self.push(b, kind),
                None => {
                    self.reset();
                    Err(FrameError::InvalidEscape(byte))
                }
            },
        }
    }

    /// Feed a run of bytes, logging and skipping malformed frames.
    ///
    /// Returns the first complete frame; bytes after it are not consumed.
    pub fn feed(&mut self, data: &[u8], now_ms: u64) -> (Option<Frame>, usize) {
        for (i, &byte) in data.iter().enumerate() {
            match self.feed_byte(byte, now_ms) {
                Ok(Some(frame)) => return (Some(frame), i + 1),
                Ok(None) => {}
                Err(e) => warn!("KISS: frame dropped: {e}"),
            }
        }
        (None, data.len())
    }

    /// Abandon any partial frame and wait for the next FEND.
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
        self.buffer.clear();
    }

    /// True while part of a frame payload has been received.
    pub fn in_frame(&self) -> bool {
        matches!(
            self.state,
            DecoderState::Payload(_) | DecoderState::Escape(_)
        )
    }

    fn push(&mut self, byte: u8, kind: FrameKind) -> Result<Option<Frame>, FrameError> {
        if self.buffer.push(byte).is_err() {
            self.reset();
            return Err(FrameError::Overflow);
        }
        self.state = DecoderState::Payload(kind);
        Ok(None)
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

// ── Encoder ──────────────────────────────────────────────────

/// Encoded frame storage.
pub type Encoded = heapless::Vec<u8, MAX_ENCODED_LEN>;

/// Encode `content` as a KISS frame with the given type byte.
///
/// With `escape_content` false the content bytes are copied verbatim,
/// which is what older radio firmware expects.  Returns `None` if the
/// content is longer than a message may be.
pub fn encode_frame(type_byte: u8, content: &[u8], escape_content: bool) -> Option<Encoded> {
    if content.len() > crate::message::MAX_CONTENT_LEN {
        return None;
    }

    let mut out = Encoded::new();
    out.push(FEND).ok()?;
    push_escaped(&mut out, type_byte)?;
    for &b in content {
        if escape_content {
            push_escaped(&mut out, b)?;
        } else {
            out.push(b).ok()?;
        }
    }
    out.push(FEND).ok()?;
    Some(out)
}

fn push_escaped(out: &mut Encoded, byte: u8) -> Option<()> {
    let (bytes, len) = escape(byte);
    out.extend_from_slice(&bytes[..len]).ok()
}
