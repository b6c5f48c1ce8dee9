//! Simulated spacecraft boards.
//!
//! Implements every board port with in-memory state and the same
//! acceptance rules the flight boards apply (clock years, beacon interval
//! range, schedule capacity), so the host simulator and integration tests
//! exercise realistic refusals.  Time only moves when the owner calls
//! [`SimulatedBoards::set_uptime_ms`].

use core::fmt::Write as _;

use log::{info, warn};

use crate::app::ports::{AvionicsPort, ClockPort, PayloadPort, PowerPort, Report, WatchdogPort};
use crate::beacon::{
    AvionicsBeacon, MAX_BEACON_INTERVAL_SECS, MIN_BEACON_INTERVAL_SECS, PayloadBeacon, PowerBeacon,
};
use crate::command::Timestamp;
use crate::message::TruncatingWriter;

/// Years the realtime clock accepts.
pub const CLOCK_YEARS: core::ops::RangeInclusive<u16> = 2024..=2030;

/// Scheduled picture / SSDV slots.
pub const SCHEDULE_CAPACITY: usize = 16;

pub struct SimulatedBoards {
    uptime_ms: u64,

    // Realtime clock
    clock_base: Option<(Timestamp, u64)>,

    // Avionics board
    beacon_interval_secs: u32,
    picture_times: heapless::Vec<Timestamp, SCHEDULE_CAPACITY>,
    ssdv_times: heapless::Vec<Timestamp, SCHEDULE_CAPACITY>,
    antenna_deployed: bool,

    // Payload board
    payload_active_since: Option<u64>,
    photos: u32,

    // Watchdog
    watchdog_services: u64,
    reset_requested: bool,
}

impl Default for SimulatedBoards {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBoards {
    pub fn new() -> Self {
        Self {
            uptime_ms: 0,
            clock_base: None,
            beacon_interval_secs: 0,
            picture_times: heapless::Vec::new(),
            ssdv_times: heapless::Vec::new(),
            antenna_deployed: true,
            payload_active_since: None,
            photos: 0,
            watchdog_services: 0,
            reset_requested: false,
        }
    }

    /// Advance simulated time.
    pub fn set_uptime_ms(&mut self, now_ms: u64) {
        self.uptime_ms = now_ms;
    }

    pub fn set_antenna_deployed(&mut self, deployed: bool) {
        self.antenna_deployed = deployed;
    }

    pub fn set_photo_count(&mut self, photos: u32) {
        self.photos = photos;
    }

    pub fn payload_active(&self) -> bool {
        self.payload_active_since.is_some()
    }

    pub fn watchdog_services(&self) -> u64 {
        self.watchdog_services
    }

    /// True once a command has asked the watchdog to reset the processor.
    pub fn reset_requested(&self) -> bool {
        self.reset_requested
    }

    fn elapsed_secs_since(&self, since_ms: u64) -> u64 {
        self.uptime_ms.saturating_sub(since_ms) / 1_000
    }
}

// ── Calendar helpers ─────────────────────────────────────────

fn is_leap(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_valid(t: &Timestamp) -> bool {
    CLOCK_YEARS.contains(&t.year)
        && (1..=12).contains(&t.month)
        && t.day >= 1
        && t.day <= days_in_month(t.year, t.month)
        && t.hour < 24
        && t.minute < 60
        && t.second < 60
}

/// `t` moved forward by `secs` seconds.
fn advance(mut t: Timestamp, secs: u64) -> Timestamp {
    let total = u64::from(t.second) + secs;
    t.second = (total % 60) as u8;
    let total = u64::from(t.minute) + total / 60;
    t.minute = (total % 60) as u8;
    let total = u64::from(t.hour) + total / 60;
    t.hour = (total % 24) as u8;
    let mut days = total / 24;
    while days > 0 {
        let remaining_in_month = u64::from(days_in_month(t.year, t.month) - t.day);
        if days <= remaining_in_month {
            t.day += days as u8;
            break;
        }
        days -= remaining_in_month + 1;
        t.day = 1;
        if t.month == 12 {
            t.month = 1;
            t.year = t.year.saturating_add(1);
        } else {
            t.month += 1;
        }
    }
    t
}

// ── ClockPort ────────────────────────────────────────────────

impl ClockPort for SimulatedBoards {
    fn set_clock(&mut self, time: Timestamp) -> bool {
        if !is_valid(&time) {
            warn!("SIM: rejecting clock time {time}");
            return false;
        }
        info!("SIM: clock set to {time}");
        self.clock_base = Some((time, self.uptime_ms));
        true
    }

    fn clock_time(&mut self) -> Option<Timestamp> {
        let (base, at_ms) = self.clock_base?;
        Some(advance(base, self.elapsed_secs_since(at_ms)))
    }

    fn clock_is_set(&self) -> bool {
        self.clock_base.is_some()
    }

    fn unset_clock(&mut self) -> bool {
        self.clock_base = None;
        true
    }
}

// ── AvionicsPort ─────────────────────────────────────────────

impl AvionicsPort for SimulatedBoards {
    fn set_beacon_interval(&mut self, seconds: u32) -> bool {
        if seconds != 0 && !(MIN_BEACON_INTERVAL_SECS..=MAX_BEACON_INTERVAL_SECS).contains(&seconds) {
            warn!(
                "SIM: beacon interval must be 0 or {MIN_BEACON_INTERVAL_SECS}..={MAX_BEACON_INTERVAL_SECS}, got {seconds}"
            );
            return false;
        }
        self.beacon_interval_secs = seconds;
        true
    }

    fn beacon_interval(&self) -> u32 {
        self.beacon_interval_secs
    }

    fn add_picture_time(&mut self, time: Timestamp) -> bool {
        is_valid(&time) && self.picture_times.push(time).is_ok()
    }

    fn add_ssdv_time(&mut self, time: Timestamp) -> bool {
        is_valid(&time) && self.ssdv_times.push(time).is_ok()
    }

    fn clear_picture_times(&mut self) -> bool {
        self.picture_times.clear();
        self.ssdv_times.clear();
        true
    }

    fn picture_times(&mut self) -> Option<Report> {
        let mut report = Report::new();
        let mut w = TruncatingWriter(&mut report);
        let _ = write!(w, "{}", self.picture_times.len() + self.ssdv_times.len());
        for t in &self.picture_times {
            let _ = write!(w, " P{t}");
        }
        for t in &self.ssdv_times {
            let _ = write!(w, " S{t}");
        }
        Some(report)
    }

    fn telemetry(&mut self) -> Option<Report> {
        let mut report = Report::new();
        let _ = write!(
            TruncatingWriter(&mut report),
            "uptime={} clock={} beacon={} scheduled={} payload={}",
            self.uptime_ms / 1_000,
            if self.clock_is_set() { "set" } else { "unset" },
            self.beacon_interval_secs,
            self.picture_times.len() + self.ssdv_times.len(),
            if self.payload_active() { "on" } else { "off" },
        );
        Some(report)
    }

    fn avionics_status(&mut self) -> AvionicsBeacon {
        if !self.antenna_deployed {
            AvionicsBeacon::AntennaDeployError
        } else if !self.clock_is_set() {
            AvionicsBeacon::UnknownTime
        } else {
            AvionicsBeacon::EverythingOk
        }
    }

    fn beacon_permitted(&self) -> bool {
        self.antenna_deployed && !self.payload_active()
    }
}

// ── PowerPort ────────────────────────────────────────────────

impl PowerPort for SimulatedBoards {
    fn power_detail(&mut self) -> Option<Report> {
        let mut report = Report::new();
        let draw_ma = if self.payload_active() { 640 } else { 210 };
        let _ = write!(
            TruncatingWriter(&mut report),
            "bus=7.92V draw={draw_ma}mA solar=1.4W battery=21C"
        );
        Some(report)
    }

    fn power_status(&mut self) -> PowerBeacon {
        PowerBeacon::Good
    }
}

// ── PayloadPort ──────────────────────────────────────────────

impl PayloadPort for SimulatedBoards {
    fn communicate(&mut self) -> bool {
        if self.payload_active() {
            warn!("SIM: payload already active");
            return false;
        }
        info!("SIM: payload powered for communication");
        self.payload_active_since = Some(self.uptime_ms);
        true
    }

    fn power_down(&mut self) -> bool {
        self.payload_active_since = None;
        true
    }

    fn photo_count(&mut self) -> Option<u32> {
        Some(self.photos)
    }

    fn payload_status(&mut self) -> PayloadBeacon {
        match self.payload_active_since {
            Some(since) => PayloadBeacon::Communicate {
                minute: (self.elapsed_secs_since(since) / 60).min(u64::from(u8::MAX)) as u8,
            },
            None => PayloadBeacon::Idle,
        }
    }
}

// ── WatchdogPort ─────────────────────────────────────────────

impl WatchdogPort for SimulatedBoards {
    fn service(&mut self) {
        self.watchdog_services += 1;
    }

    fn force_reset(&mut self) {
        warn!("SIM: watchdog reset requested");
        self.reset_requested = true;
    }
}
