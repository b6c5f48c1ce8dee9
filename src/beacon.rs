//! Beacon status codes and the beacon timer.
//!
//! A beacon is three characters, one per board (power, avionics,
//! payload), transmitted by the radio in CW so amateur stations can
//! report spacecraft health.  The radio appends its own status before
//! transmission.
//!
//! Beacon timing uses the monotonic loop clock, never the RTC.

use log::{debug, info};

use crate::app::ports::Boards;
use crate::link::transport::MessageSink;
use crate::message::{Message, MessageKind};

/// Beacon intervals outside `0 | MIN..=MAX` seconds are refused by the avionics board.
pub const MIN_BEACON_INTERVAL_SECS: u32 = 60;
pub const MAX_BEACON_INTERVAL_SECS: u32 = 600;

/// Power board health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerBeacon {
    Excellent,
    Good,
    Fair,
    Poor,
    Unknown,
}

impl PowerBeacon {
    pub const fn code(self) -> char {
        match self {
            Self::Excellent => 'S',
            Self::Good => 'E',
            Self::Fair => 'I',
            Self::Poor => 'T',
            Self::Unknown => 'A',
        }
    }
}

/// Avionics board health, most severe condition first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvionicsBeacon {
    EverythingOk,
    UnknownTime,
    FramInitError,
    AntennaDeployError,
    ImuInitError,
    RadioConnectionError,
    Unstable,
    RtcInitError,
    PowerBoardInitError,
    WatchdogReset,
    Unknown,
}

impl AvionicsBeacon {
    pub const fn code(self) -> char {
        match self {
            Self::EverythingOk => 'E',
            Self::UnknownTime => 'S',
            Self::FramInitError => 'A',
            Self::AntennaDeployError => 'H',
            Self::ImuInitError => 'N',
            Self::RadioConnectionError => 'U',
            Self::Unstable => 'I',
            Self::RtcInitError => 'D',
            Self::PowerBoardInitError => 'R',
            Self::WatchdogReset => 'T',
            Self::Unknown => '5',
        }
    }
}

/// Payload board activity.  `minute` is how far into the activity the
/// payload is; minutes past the table's end report as the last bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadBeacon {
    Idle,
    Communicate { minute: u8 },
    CommunicateTimeout,
    Photo { minute: u8 },
    PhotoTimeout,
    Overcurrent { minute: u8 },
    Unknown,
}

const COMMUNICATE_CODES: [char; 10] = ['I', 'V', 'W', 'L', '5', 'A', 'H', 'M', '4', '6'];
const PHOTO_CODES: [char; 10] = ['B', 'S', 'T', 'N', 'R', 'U', 'D', 'F', 'G', 'K'];
const OVERCURRENT_CODES: [char; 10] = ['7', 'X', 'Z', 'P', '3', '3', 'J', 'J', 'Q', 'Q'];

impl PayloadBeacon {
    pub fn code(self) -> char {
        let bucket = |minute: u8| usize::from(minute).min(9);
        match self {
            Self::Idle => 'E',
            Self::Communicate { minute } => COMMUNICATE_CODES[bucket(minute)],
            Self::CommunicateTimeout => 'C',
            Self::Photo { minute } => PHOTO_CODES[bucket(minute)],
            Self::PhotoTimeout => 'O',
            Self::Overcurrent { minute } => OVERCURRENT_CODES[bucket(minute)],
            Self::Unknown => '9',
        }
    }
}

/// The three-board status beacon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beacon {
    pub power: PowerBeacon,
    pub avionics: AvionicsBeacon,
    pub payload: PayloadBeacon,
}

impl Beacon {
    pub fn new(power: PowerBeacon, avionics: AvionicsBeacon, payload: PayloadBeacon) -> Self {
        Self {
            power,
            avionics,
            payload,
        }
    }

    /// Collect the current status of every board.
    pub fn from_boards(boards: &mut impl Boards) -> Self {
        Self::new(
            boards.power_status(),
            boards.avionics_status(),
            boards.payload_status(),
        )
    }

    pub fn to_message(&self) -> Message {
        Message::formatted(
            MessageKind::Beacon,
            format_args!(
                "{}{}{}",
                self.power.code(),
                self.avionics.code(),
                self.payload.code()
            ),
        )
    }
}

// ═══════════════════════════════════════════════════════════════
//  Beacon timer
// ═══════════════════════════════════════════════════════════════

/// Sends a beacon each time the avionics board's interval elapses.
///
/// Beacons stop after a long silence from the ground and are skipped
/// while the boards say the radio must stay quiet (antenna deployment
/// unfinished, payload active).  A skipped beacon still restarts the
/// interval.
pub struct BeaconScheduler {
    interval_secs: u32,
    last_beacon_ms: u64,
    sent: u32,
}

impl BeaconScheduler {
    pub fn new() -> Self {
        Self {
            interval_secs: 0,
            last_beacon_ms: 0,
            sent: 0,
        }
    }

    /// Send a beacon if one is due.  Returns `true` if one was sent.
    pub fn poll(
        &mut self,
        now_ms: u64,
        ground_contact: bool,
        boards: &mut impl Boards,
        sink: &mut impl MessageSink,
    ) -> bool {
        let interval = boards.beacon_interval();
        if interval != self.interval_secs {
            // An interval change restarts the timer.
            debug!("BEACON: interval {} -> {} s", self.interval_secs, interval);
            self.interval_secs = interval;
            self.last_beacon_ms = now_ms;
            return false;
        }

        if interval == 0
            || now_ms.saturating_sub(self.last_beacon_ms) <= u64::from(interval) * 1_000
            || !ground_contact
        {
            return false;
        }
        self.last_beacon_ms = now_ms;

        if !boards.beacon_permitted() {
            debug!("BEACON: skipped, radio must stay quiet");
            return false;
        }

        let beacon = Beacon::from_boards(boards);
        let message = beacon.to_message();
        info!("BEACON: {}", message.content());
        let ok = sink.send(&message);
        if ok {
            self.sent = self.sent.wrapping_add(1);
        }
        ok
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }
}

impl Default for BeaconScheduler {
    fn default() -> Self {
        Self::new()
    }
}
