//! Port traits: the hexagonal boundary between the command link and the boards.
//!
//! ```text
//!   Board adapter ──▶ Port trait ──▶ Command execution / FlightLoop
//! ```
//!
//! The realtime clock, avionics board services, power board, payload board
//! and watchdog are all reached through these traits.  Commands receive
//! them as a single `&mut impl Boards`, so the link logic never touches
//! hardware directly and runs unchanged against the host simulator or
//! test mocks.
//!
//! Every method returns promptly.  A `false` / `None` return means the
//! collaborator refused or failed; the caller reports `RES ERR` and moves on.

use crate::beacon::{AvionicsBeacon, PayloadBeacon, PowerBeacon};
use crate::command::Timestamp;

pub use crate::link::transport::{MessageSink, SerialPort};

/// Longest free-form report a board may return.
pub const REPORT_LEN: usize = 200;

/// Free-form board report (telemetry, schedules, power detail).
pub type Report = heapless::String<REPORT_LEN>;

// ───────────────────────────────────────────────────────────────
// Realtime clock
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Set the clock.  Refuses dates the clock considers invalid.
    fn set_clock(&mut self, time: Timestamp) -> bool;

    /// Current time, or `None` if the clock is unset or unreadable.
    fn clock_time(&mut self) -> Option<Timestamp>;

    fn clock_is_set(&self) -> bool;

    /// Mark the clock unset (forces the beacon to report unknown time).
    fn unset_clock(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Avionics board services
// ───────────────────────────────────────────────────────────────

pub trait AvionicsPort {
    /// Seconds between beacons; 0 disables.  Out-of-range values are refused.
    fn set_beacon_interval(&mut self, seconds: u32) -> bool;

    fn beacon_interval(&self) -> u32;

    /// Schedule a picture.
    fn add_picture_time(&mut self, time: Timestamp) -> bool;

    /// Schedule an SSDV image transmission.
    fn add_ssdv_time(&mut self, time: Timestamp) -> bool;

    fn clear_picture_times(&mut self) -> bool;

    /// Report of every scheduled picture and SSDV time.
    fn picture_times(&mut self) -> Option<Report>;

    fn telemetry(&mut self) -> Option<Report>;

    fn avionics_status(&mut self) -> AvionicsBeacon;

    /// False while the radio must stay quiet (antenna deployment
    /// unfinished, payload active).
    fn beacon_permitted(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Power board
// ───────────────────────────────────────────────────────────────

pub trait PowerPort {
    /// Detailed power report (bus voltages, currents, temperatures).
    fn power_detail(&mut self) -> Option<Report>;

    fn power_status(&mut self) -> PowerBeacon;
}

// ───────────────────────────────────────────────────────────────
// Payload board
// ───────────────────────────────────────────────────────────────

pub trait PayloadPort {
    /// Power up the payload for a communication session.
    fn communicate(&mut self) -> bool;

    fn power_down(&mut self) -> bool;

    /// Number of photos stored on the payload.
    fn photo_count(&mut self) -> Option<u32>;

    fn payload_status(&mut self) -> PayloadBeacon;
}

// ───────────────────────────────────────────────────────────────
// Watchdog
// ───────────────────────────────────────────────────────────────

pub trait WatchdogPort {
    /// Pet the watchdog.  Called once per loop tick.
    fn service(&mut self);

    /// Stop petting so the watchdog resets the processor.
    fn force_reset(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Aggregate
// ───────────────────────────────────────────────────────────────

/// Everything a command may touch.
pub trait Boards: ClockPort + AvionicsPort + PowerPort + PayloadPort + WatchdogPort {}

impl<T> Boards for T where T: ClockPort + AvionicsPort + PowerPort + PayloadPort + WatchdogPort {}
