//! Uplink commands.
//!
//! ```text
//!   tokens ──▶ catalog::build_command ──▶ CommandPool slot ──▶ PooledCommand
//!                                                                 │
//!                          acknowledge_command (ACK / NACK) ◀─────┤
//!                          execute_command (RES <TAG> …)    ◀─────┘
//! ```
//!
//! Every mnemonic the ground can send maps to one [`Command`] variant.
//! Text that names no known mnemonic becomes [`Command::Unknown`]; a known
//! mnemonic with bad arguments becomes [`Command::Invalid`].  Both are
//! negatively acknowledged and never execute.

pub mod catalog;
pub mod execute;
pub mod pool;

use core::fmt;

use crate::error::CommandError;

pub use catalog::build_command;
pub use pool::{CommandPool, PooledCommand};

/// Calendar time as sent by the ground (UTC).
///
/// Only the field widths are checked here; whether the date makes sense
/// is the clock's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Operation identifier, one per command kind.  Indexes the command pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
    SetClock,
    BeaconSp,
    PicTimes,
    SsdvTimes,
    ClearPicTimes,
    UnsetClock,
    ReportT,
    GetPicTimes,
    GetTelemetry,
    GetPower,
    GetPhotos,
    GetComms,
    GetBeaconInterval,
    NoOperate,
    SendTestPacket,
    PayComms,
    TweeSlee,
    Watchdog,
    ModifyMode,
    ModifyFrequency,
    AdjustFrequency,
    TransmitCw,
    BackgroundRssi,
    CurrentRssi,
    SweepTransmitter,
    SweepReceiver,
    QueryRegister,
    Invalid,
    Unknown,
}

impl Operation {
    pub const COUNT: usize = 29;

    pub const ALL: [Self; Self::COUNT] = [
        Self::SetClock,
        Self::BeaconSp,
        Self::PicTimes,
        Self::SsdvTimes,
        Self::ClearPicTimes,
        Self::UnsetClock,
        Self::ReportT,
        Self::GetPicTimes,
        Self::GetTelemetry,
        Self::GetPower,
        Self::GetPhotos,
        Self::GetComms,
        Self::GetBeaconInterval,
        Self::NoOperate,
        Self::SendTestPacket,
        Self::PayComms,
        Self::TweeSlee,
        Self::Watchdog,
        Self::ModifyMode,
        Self::ModifyFrequency,
        Self::AdjustFrequency,
        Self::TransmitCw,
        Self::BackgroundRssi,
        Self::CurrentRssi,
        Self::SweepTransmitter,
        Self::SweepReceiver,
        Self::QueryRegister,
        Self::Invalid,
        Self::Unknown,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Frequency sweep run by the radio board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sweep {
    pub start_hz: u32,
    pub stop_hz: u32,
    pub steps: u16,
    pub dwell_ms: u16,
}

/// A fully parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetClock(Timestamp),
    BeaconSp { seconds: u32 },
    PicTimes(Timestamp),
    SsdvTimes(Timestamp),
    ClearPicTimes,
    UnsetClock,
    ReportT,
    GetPicTimes,
    GetTelemetry,
    GetPower,
    GetPhotos,
    GetComms,
    GetBeaconInterval,
    NoOperate,
    SendTestPacket,
    PayComms,
    TweeSlee,
    Watchdog,
    ModifyMode { mode: char },
    /// Radio board commands; their replies come back as local frames.
    ModifyFrequency { hz: u32 },
    AdjustFrequency { hz: u32 },
    TransmitCw { seconds: u8 },
    BackgroundRssi { seconds: u8 },
    CurrentRssi,
    SweepTransmitter(Sweep),
    SweepReceiver(Sweep),
    QueryRegister { register: u32 },
    /// Known mnemonic, unusable arguments.
    Invalid(CommandError),
    /// Unrecognised mnemonic.
    Unknown,
}

impl Command {
    pub const fn operation(&self) -> Operation {
        match self {
            Self::SetClock(_) => Operation::SetClock,
            Self::BeaconSp { .. } => Operation::BeaconSp,
            Self::PicTimes(_) => Operation::PicTimes,
            Self::SsdvTimes(_) => Operation::SsdvTimes,
            Self::ClearPicTimes => Operation::ClearPicTimes,
            Self::UnsetClock => Operation::UnsetClock,
            Self::ReportT => Operation::ReportT,
            Self::GetPicTimes => Operation::GetPicTimes,
            Self::GetTelemetry => Operation::GetTelemetry,
            Self::GetPower => Operation::GetPower,
            Self::GetPhotos => Operation::GetPhotos,
            Self::GetComms => Operation::GetComms,
            Self::GetBeaconInterval => Operation::GetBeaconInterval,
            Self::NoOperate => Operation::NoOperate,
            Self::SendTestPacket => Operation::SendTestPacket,
            Self::PayComms => Operation::PayComms,
            Self::TweeSlee => Operation::TweeSlee,
            Self::Watchdog => Operation::Watchdog,
            Self::ModifyMode { .. } => Operation::ModifyMode,
            Self::ModifyFrequency { .. } => Operation::ModifyFrequency,
            Self::AdjustFrequency { .. } => Operation::AdjustFrequency,
            Self::TransmitCw { .. } => Operation::TransmitCw,
            Self::BackgroundRssi { .. } => Operation::BackgroundRssi,
            Self::CurrentRssi => Operation::CurrentRssi,
            Self::SweepTransmitter(_) => Operation::SweepTransmitter,
            Self::SweepReceiver(_) => Operation::SweepReceiver,
            Self::QueryRegister { .. } => Operation::QueryRegister,
            Self::Invalid(_) => Operation::Invalid,
            Self::Unknown => Operation::Unknown,
        }
    }

    /// Resting content of an empty pool slot.
    pub(crate) const fn placeholder(operation: Operation) -> Self {
        match operation {
            Operation::SetClock => Self::SetClock(EPOCH),
            Operation::BeaconSp => Self::BeaconSp { seconds: 0 },
            Operation::PicTimes => Self::PicTimes(EPOCH),
            Operation::SsdvTimes => Self::SsdvTimes(EPOCH),
            Operation::ClearPicTimes => Self::ClearPicTimes,
            Operation::UnsetClock => Self::UnsetClock,
            Operation::ReportT => Self::ReportT,
            Operation::GetPicTimes => Self::GetPicTimes,
            Operation::GetTelemetry => Self::GetTelemetry,
            Operation::GetPower => Self::GetPower,
            Operation::GetPhotos => Self::GetPhotos,
            Operation::GetComms => Self::GetComms,
            Operation::GetBeaconInterval => Self::GetBeaconInterval,
            Operation::NoOperate => Self::NoOperate,
            Operation::SendTestPacket => Self::SendTestPacket,
            Operation::PayComms => Self::PayComms,
            Operation::TweeSlee => Self::TweeSlee,
            Operation::Watchdog => Self::Watchdog,
            Operation::ModifyMode => Self::ModifyMode { mode: ' ' },
            Operation::ModifyFrequency => Self::ModifyFrequency { hz: 0 },
            Operation::AdjustFrequency => Self::AdjustFrequency { hz: 0 },
            Operation::TransmitCw => Self::TransmitCw { seconds: 0 },
            Operation::BackgroundRssi => Self::BackgroundRssi { seconds: 0 },
            Operation::CurrentRssi => Self::CurrentRssi,
            Operation::SweepTransmitter => Self::SweepTransmitter(IDLE_SWEEP),
            Operation::SweepReceiver => Self::SweepReceiver(IDLE_SWEEP),
            Operation::QueryRegister => Self::QueryRegister { register: 0 },
            Operation::Invalid => Self::Invalid(CommandError::Unparseable),
            Operation::Unknown => Self::Unknown,
        }
    }

    /// True for the two variants that are refused with a NACK.
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Invalid(_) | Self::Unknown)
    }
}

const IDLE_SWEEP: Sweep = Sweep {
    start_hz: 0,
    stop_hz: 0,
    steps: 0,
    dwell_ms: 0,
};

const EPOCH: Timestamp = Timestamp {
    year: 0,
    month: 0,
    day: 0,
    hour: 0,
    minute: 0,
    second: 0,
};
