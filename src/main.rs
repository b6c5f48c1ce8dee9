//! Avionics host simulator: main entry point.
//!
//! Runs the flight loop against simulated boards with stdin/stdout
//! standing in for the radio serial link.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  StdioSerial        SimulatedBoards            HostClock       │
//! │  (SerialPort)       (Clock/Avionics/Power/     (uptime)        │
//! │                      Payload/Watchdog)                         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              FlightLoop (pure logic)                   │    │
//! │  │  KISS · signature check · commands · beacon            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage:
//!
//! ```text
//! avionics-sim [CONFIG.json]                 run the flight loop
//! avionics-sim sign SEQ COMMAND [ARGS...]    print a signed uplink frame
//! ```
#![deny(unused_must_use)]

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{info, warn};

use avionics::adapters::ground::GroundStation;
use avionics::adapters::simulated::SimulatedBoards;
use avionics::adapters::stdio::StdioSerial;
use avionics::adapters::time::HostClock;
use avionics::app::service::FlightLoop;
use avionics::config::AvionicsConfig;
use avionics::link::processor::Outcome;

/// Loop period; the flight loop itself never blocks.
const TICK_PERIOD: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("sign") => sign(&args[1..]),
        Some(path) => run(load_config(Some(path))?),
        None => run(load_config(None)?),
    }
}

fn load_config(path: Option<&str>) -> Result<AvionicsConfig> {
    let config: AvionicsConfig = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?
        }
        None => {
            info!("No config file given, using defaults");
            AvionicsConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

fn sign(args: &[String]) -> Result<()> {
    let [seq, command @ ..] = args else {
        bail!("usage: avionics-sim sign SEQ COMMAND [ARGS...]");
    };
    if command.is_empty() {
        bail!("usage: avionics-sim sign SEQ COMMAND [ARGS...]");
    }
    let seq: u32 = seq.parse().context("sequence must be a decimal number")?;
    let config = AvionicsConfig::default();
    let mut ground = GroundStation::new(config.secret, seq);
    let frame = ground
        .uplink(&command.join(" "))
        .context("command too long to sign")?;
    let mut out = std::io::stdout().lock();
    out.write_all(&frame)?;
    out.flush()?;
    Ok(())
}

fn report_shutdown(flight: &FlightLoop<StdioSerial>, clock: &HostClock) {
    let stats = flight.command_stats();
    info!(
        "Watchdog reset requested after {} ticks, {} s ({} ok, {} failed, {} rejected)",
        flight.tick_count(),
        clock.uptime_secs(),
        stats.successful,
        stats.failed,
        stats.rejected
    );

    let link = flight.processor().link_stats();
    info!(
        "Link: {} frames in, {} dropped, {} messages out, {} send failures, {} beacons",
        link.frames_received,
        link.frames_dropped,
        link.messages_sent,
        link.send_failures,
        flight.beacons_sent()
    );

    let pool = flight.processor().pool();
    info!("Command pool: {} loads", pool.loads());
    if let Some(operation) = pool.in_use() {
        warn!("Command pool: slot {operation:?} still held");
    }
}

fn run(config: AvionicsConfig) -> Result<()> {
    info!("╔══════════════════════════════════════╗");
    info!("║  Avionics sim v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let serial = StdioSerial::spawn().context("starting stdin reader")?;
    let clock = HostClock::new();
    let mut boards = SimulatedBoards::new();
    let mut flight = FlightLoop::new(serial, &config);

    loop {
        let now_ms = clock.uptime_ms();
        boards.set_uptime_ms(now_ms);

        if let Some(outcome) = flight.tick(&mut boards, now_ms) {
            match outcome {
                Outcome::Rejected(e) => warn!("Uplink rejected: {e}"),
                other => info!("Uplink: {other:?}"),
            }
        }

        if boards.reset_requested() {
            report_shutdown(&flight, &clock);
            return Ok(());
        }

        thread::sleep(TICK_PERIOD);
    }
}
