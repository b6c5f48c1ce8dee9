//! Serial transport: the byte channel to the radio board.
//!
//! [`SerialPort`] abstracts the UART so the link can run against real
//! hardware, the host simulator's stdin/stdout, or an in-memory loopback
//! in tests.  [`FrameTransport`] sits on top: it drains the port through
//! the KISS decoder and encodes outbound [`Message`]s.

use log::{debug, trace, warn};

use crate::config::AvionicsConfig;
use crate::message::Message;

use super::kiss::{Frame, FrameDecoder, encode_frame};

/// Byte-oriented serial channel.  Every method must return immediately.
pub trait SerialPort {
    /// Error type for this port.
    type Error: core::fmt::Debug;

    /// Number of bytes that can be read without waiting.
    fn available(&self) -> usize;

    /// Read one byte, or `None` if nothing is buffered.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write `data`, returning the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;
}

/// Anything that can put a [`Message`] on the downlink.
///
/// Commands only ever see this, never the serial port itself.
pub trait MessageSink {
    /// Send one message.  `true` if it was fully handed to the port.
    fn send(&mut self, message: &Message) -> bool;
}

/// A null port that discards all writes and never reads.
/// Useful as a default when no radio is attached.
pub struct NullSerial;

impl SerialPort for NullSerial {
    type Error = ();

    fn available(&self) -> usize {
        0
    }

    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }
}

/// Link counters, kept for telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub frames_received: u32,
    pub frames_dropped: u32,
    pub messages_sent: u32,
    pub send_failures: u32,
}

/// KISS framing over a [`SerialPort`].
pub struct FrameTransport<S: SerialPort> {
    serial: S,
    decoder: FrameDecoder,
    escape_outbound: bool,
    last_contact_ms: u64,
    stats: LinkStats,
}

impl<S: SerialPort> FrameTransport<S> {
    pub fn new(serial: S, config: &AvionicsConfig) -> Self {
        Self {
            serial,
            decoder: FrameDecoder::with_timeout(u64::from(config.frame_timeout_ms)),
            escape_outbound: config.escape_outbound,
            last_contact_ms: 0,
            stats: LinkStats::default(),
        }
    }

    /// Drain whatever bytes are buffered and return the first complete frame.
    ///
    /// Bytes after that frame stay in the port for the next call, so
    /// frames are always handled in arrival order.
    pub fn poll(&mut self, now_ms: u64) -> Option<Frame> {
        while self.serial.available() > 0 {
            let Some(byte) = self.serial.read_byte() else {
                break;
            };
            match self.decoder.feed_byte(byte, now_ms) {
                Ok(Some(frame)) => {
                    self.stats.frames_received = self.stats.frames_received.wrapping_add(1);
                    self.last_contact_ms = now_ms;
                    debug!(
                        "KISS: rx {:?} frame, {} bytes",
                        frame.kind,
                        frame.payload.len()
                    );
                    return Some(frame);
                }
                Ok(None) => {}
                Err(e) => {
                    self.stats.frames_dropped = self.stats.frames_dropped.wrapping_add(1);
                    warn!("KISS: frame dropped: {e}");
                }
            }
        }
        None
    }

    /// Milliseconds since the last complete frame of either kind (or since boot).
    pub fn ms_since_ground_contact(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_contact_ms)
    }

    /// True if a complete frame arrived within `window_ms`.
    pub fn recent_ground_contact(&self, now_ms: u64, window_ms: u64) -> bool {
        self.ms_since_ground_contact(now_ms) <= window_ms
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }
}

impl<S: SerialPort> MessageSink for FrameTransport<S> {
    fn send(&mut self, message: &Message) -> bool {
        let Some(wire) = encode_frame(
            message.type_byte(),
            message.content().as_bytes(),
            self.escape_outbound,
        ) else {
            warn!("KISS: message too long to encode");
            self.stats.send_failures = self.stats.send_failures.wrapping_add(1);
            return false;
        };

        trace!(
            "KISS: tx type=0x{:02X} \"{}\"",
            message.type_byte(),
            message.content()
        );

        match self.serial.write(&wire) {
            Ok(n) if n == wire.len() => {
                self.stats.messages_sent = self.stats.messages_sent.wrapping_add(1);
                true
            }
            Ok(n) => {
                warn!("KISS: short write ({n} of {} bytes)", wire.len());
                self.stats.send_failures = self.stats.send_failures.wrapping_add(1);
                false
            }
            Err(e) => {
                warn!("KISS: write failed: {e:?}");
                self.stats.send_failures = self.stats.send_failures.wrapping_add(1);
                false
            }
        }
    }
}
