//! Flight loop: the cooperative control-loop step.
//!
//! [`FlightLoop`] owns the command processor and the beacon timer.  Each
//! [`tick`](FlightLoop::tick) pets the watchdog, sends a beacon if one is
//! due, and processes at most one inbound frame.  Nothing here blocks; the
//! caller decides how often to tick.
//!
//! ```text
//!                ┌──────────────────────────────┐
//!  SerialPort ──▶│          FlightLoop          │──▶ SerialPort
//!                │  watchdog · beacon · uplink  │
//!      Boards ◀──│                              │
//!                └──────────────────────────────┘
//! ```

use log::info;

use crate::beacon::BeaconScheduler;
use crate::config::AvionicsConfig;
use crate::link::processor::{CommandProcessor, CommandStats, Outcome};
use crate::link::transport::SerialPort;

use super::ports::Boards;

pub struct FlightLoop<S: SerialPort> {
    processor: CommandProcessor<S>,
    beacon: BeaconScheduler,
    ground_contact_window_ms: u64,
    tick_count: u64,
}

impl<S: SerialPort> FlightLoop<S> {
    pub fn new(serial: S, config: &AvionicsConfig) -> Self {
        info!(
            "FlightLoop: validation {}, expecting sequence {}",
            if config.validation_required {
                "required"
            } else {
                "advisory"
            },
            config.initial_sequence
        );
        Self {
            processor: CommandProcessor::new(serial, config),
            beacon: BeaconScheduler::new(),
            ground_contact_window_ms: config.ground_contact_window_ms(),
            tick_count: 0,
        }
    }

    /// Run one loop step at monotonic time `now_ms`.
    ///
    /// Returns what happened to the inbound frame, if one completed.
    pub fn tick(&mut self, boards: &mut impl Boards, now_ms: u64) -> Option<Outcome> {
        self.tick_count += 1;

        // 1. Watchdog
        boards.service();

        // 2. Beacon
        let contact = self
            .processor
            .transport()
            .recent_ground_contact(now_ms, self.ground_contact_window_ms);
        self.beacon
            .poll(now_ms, contact, boards, self.processor.transport_mut());

        // 3. Uplink
        self.processor.check_for_command(boards, now_ms)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn command_stats(&self) -> CommandStats {
        self.processor.stats()
    }

    pub fn beacons_sent(&self) -> u32 {
        self.beacon.sent()
    }

    pub fn processor(&self) -> &CommandProcessor<S> {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut CommandProcessor<S> {
        &mut self.processor
    }
}
