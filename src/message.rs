//! Outbound message envelopes.
//!
//! Everything the spacecraft sends is a [`Message`]: a KISS type byte plus
//! bounded text content.  Ground-facing traffic (acknowledgements and
//! `RES <TAG> <data>` responses) goes out as Remote frames; instructions
//! for the radio go out with the radio's own command type byte.
//!
//! Content never exceeds [`MAX_CONTENT_LEN`] bytes.  Longer text is
//! truncated at a character boundary rather than rejected.

use core::fmt::{self, Write as _};

use crate::link::kiss::FrameKind;

/// Maximum content length of one outbound message.
pub const MAX_CONTENT_LEN: usize = 256;

/// Fixed-capacity message text.
pub type Content = heapless::String<MAX_CONTENT_LEN>;

// ── Radio local commands ─────────────────────────────────────

/// Commands understood by the radio board, keyed by their KISS type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RadioCommand {
    AntennaRelease = 0x08,
    GetStatus = 0x09,
    Halt = 0x0A,
    ModifyFrequency = 0x0B,
    ModifyMode = 0x0C,
    AdjustFrequency = 0x0D,
    ToggleRadio5v = 0x0F,
    TransmitCw = 0x17,
    BackgroundRssi = 0x18,
    CurrentRssi = 0x19,
    SweepTransmitter = 0x1A,
    SweepReceiver = 0x1B,
    QueryRegister = 0x1C,
}

impl RadioCommand {
    pub const fn type_byte(self) -> u8 {
        self as u8
    }

    pub fn from_type_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x08 => Self::AntennaRelease,
            0x09 => Self::GetStatus,
            0x0A => Self::Halt,
            0x0B => Self::ModifyFrequency,
            0x0C => Self::ModifyMode,
            0x0D => Self::AdjustFrequency,
            0x0F => Self::ToggleRadio5v,
            0x17 => Self::TransmitCw,
            0x18 => Self::BackgroundRssi,
            0x19 => Self::CurrentRssi,
            0x1A => Self::SweepTransmitter,
            0x1B => Self::SweepReceiver,
            0x1C => Self::QueryRegister,
            _ => return None,
        })
    }

    /// Tag used when relaying the radio's reply to this command to the ground.
    ///
    /// Commands the radio never answers with data have no tag.
    pub const fn response_tag(self) -> Option<ResponseTag> {
        match self {
            Self::GetStatus => Some(ResponseTag::RadioStatus),
            Self::ModifyFrequency => Some(ResponseTag::RadioModifyFrequency),
            Self::ModifyMode => Some(ResponseTag::RadioModifyMode),
            Self::AdjustFrequency => Some(ResponseTag::RadioAdjustFrequency),
            Self::TransmitCw => Some(ResponseTag::RadioTransmitCw),
            Self::BackgroundRssi => Some(ResponseTag::RadioBackgroundRssi),
            Self::CurrentRssi => Some(ResponseTag::RadioCurrentRssi),
            Self::SweepTransmitter => Some(ResponseTag::RadioSweepTransmitter),
            Self::SweepReceiver => Some(ResponseTag::RadioSweepReceiver),
            Self::QueryRegister => Some(ResponseTag::RadioQueryRegister),
            Self::AntennaRelease | Self::Halt | Self::ToggleRadio5v => None,
        }
    }
}

// ── Response tags ────────────────────────────────────────────

/// Three-letter tag after `RES` identifying what a response answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTag {
    SetClock,
    BeaconInterval,
    PictureTime,
    SsdvTime,
    ClearPictureTimes,
    UnsetClock,
    ReportTime,
    PictureTimes,
    Telemetry,
    Power,
    Photos,
    GetBeaconInterval,
    NoOperate,
    TestPacket,
    PayloadComms,
    TweeSlee,
    Watchdog,
    Error,
    RadioStatus,
    RadioModifyFrequency,
    RadioModifyMode,
    RadioAdjustFrequency,
    RadioTransmitCw,
    RadioBackgroundRssi,
    RadioCurrentRssi,
    RadioSweepTransmitter,
    RadioSweepReceiver,
    RadioQueryRegister,
}

impl ResponseTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SetClock => "SRC",
            Self::BeaconInterval => "SBI",
            Self::PictureTime => "SPT",
            Self::SsdvTime => "SST",
            Self::ClearPictureTimes => "CPT",
            Self::UnsetClock => "URC",
            Self::ReportTime => "GRC",
            Self::PictureTimes => "GPT",
            Self::Telemetry => "GTY",
            Self::Power => "GPW",
            Self::Photos => "GPC",
            Self::GetBeaconInterval => "GBI",
            Self::NoOperate => "NOP",
            Self::TestPacket => "STP",
            Self::PayloadComms => "PYC",
            Self::TweeSlee => "TSL",
            Self::Watchdog => "WDG",
            Self::Error => "ERR",
            Self::RadioStatus => "GRS",
            Self::RadioModifyFrequency => "RMF",
            Self::RadioModifyMode => "RMM",
            Self::RadioAdjustFrequency => "RAF",
            Self::RadioTransmitCw => "RTC",
            Self::RadioBackgroundRssi => "RBR",
            Self::RadioCurrentRssi => "RCR",
            Self::RadioSweepTransmitter => "RST",
            Self::RadioSweepReceiver => "RSR",
            Self::RadioQueryRegister => "RQR",
        }
    }
}

impl fmt::Display for ResponseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Message ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Acknowledgement,
    NegativeAcknowledgement,
    Response,
    Beacon,
    Radio(RadioCommand),
}

impl MessageKind {
    /// Beacon type byte understood by the radio.
    pub const BEACON_TYPE: u8 = 0x07;

    pub const fn type_byte(self) -> u8 {
        match self {
            Self::Acknowledgement | Self::NegativeAcknowledgement | Self::Response => {
                FrameKind::Remote.type_byte()
            }
            Self::Beacon => Self::BEACON_TYPE,
            Self::Radio(command) => command.type_byte(),
        }
    }
}

/// One outbound message, sent immediately and never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    content: Content,
}

impl Message {
    /// Build a message, truncating `content` to [`MAX_CONTENT_LEN`].
    pub fn new(kind: MessageKind, content: &str) -> Self {
        let mut buf = Content::new();
        push_truncated(&mut buf, content);
        Self { kind, content: buf }
    }

    /// Build a message from formatted text, truncating as needed.
    pub fn formatted(kind: MessageKind, args: fmt::Arguments<'_>) -> Self {
        let mut buf = Content::new();
        let _ = TruncatingWriter(&mut buf).write_fmt(args);
        Self { kind, content: buf }
    }

    /// `ACK <sequence>`
    pub fn acknowledgement(sequence: u32) -> Self {
        Self::formatted(MessageKind::Acknowledgement, format_args!("ACK {sequence}"))
    }

    /// `NACK <sequence>`
    pub fn negative_acknowledgement(sequence: u32) -> Self {
        Self::formatted(
            MessageKind::NegativeAcknowledgement,
            format_args!("NACK {sequence}"),
        )
    }

    /// An instruction for the radio board.
    pub fn radio(command: RadioCommand, content: &str) -> Self {
        Self::new(MessageKind::Radio(command), content)
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn type_byte(&self) -> u8 {
        self.kind.type_byte()
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

// ── Response ─────────────────────────────────────────────────

/// `RES <TAG>[ <data>]`, the reply to an executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    tag: ResponseTag,
    data: Content,
}

impl Response {
    pub fn new(tag: ResponseTag) -> Self {
        Self {
            tag,
            data: Content::new(),
        }
    }

    pub fn with_data(tag: ResponseTag, data: impl fmt::Display) -> Self {
        let mut buf = Content::new();
        let _ = write!(TruncatingWriter(&mut buf), "{data}");
        Self { tag, data: buf }
    }

    /// `RES ERR`, sent when a collaborator reports failure.
    pub fn error() -> Self {
        Self::new(ResponseTag::Error)
    }

    pub fn tag(&self) -> ResponseTag {
        self.tag
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn to_message(&self) -> Message {
        if self.data.is_empty() {
            Message::formatted(MessageKind::Response, format_args!("RES {}", self.tag))
        } else {
            Message::formatted(
                MessageKind::Response,
                format_args!("RES {} {}", self.tag, self.data),
            )
        }
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Self {
        response.to_message()
    }
}

// ── Truncation helpers ───────────────────────────────────────

/// Append as much of `s` as fits, stopping at a char boundary.
/// Returns `false` if anything was cut.
pub fn push_truncated<const N: usize>(buf: &mut heapless::String<N>, s: &str) -> bool {
    let room = N - buf.len();
    if s.len() <= room {
        // Cannot fail: the length was checked above.
        let _ = buf.push_str(s);
        return true;
    }
    let mut end = room;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let _ = buf.push_str(&s[..end]);
    false
}

/// `fmt::Write` adapter that silently truncates instead of failing.
pub(crate) struct TruncatingWriter<'a, const N: usize>(pub &'a mut heapless::String<N>);

impl<const N: usize> fmt::Write for TruncatingWriter<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        push_truncated(self.0, s);
        Ok(())
    }
}
