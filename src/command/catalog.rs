//! Mnemonic table and command factory.
//!
//! Each [`CatalogEntry`] ties a mnemonic to its operation, the number of
//! arguments it takes, and how those arguments become a [`Command`].
//! Lookup is a linear scan; the table is small and fixed.

use log::{debug, warn};

use super::{Command, CommandPool, Operation, PooledCommand, Sweep, Timestamp};
use crate::error::{CommandError, ParseError};

/// How an entry turns its arguments into a command.
#[derive(Clone, Copy)]
pub enum Template {
    /// Takes no arguments; always this command.
    Fixed(Command),
    /// Parses its (already arity-checked) arguments.
    Build(fn(&[&str]) -> Result<Command, CommandError>),
}

pub struct CatalogEntry {
    pub mnemonic: &'static str,
    pub operation: Operation,
    pub arguments: usize,
    pub template: Template,
}

const fn fixed(mnemonic: &'static str, command: Command) -> CatalogEntry {
    CatalogEntry {
        mnemonic,
        operation: command.operation(),
        arguments: 0,
        template: Template::Fixed(command),
    }
}

const fn build(
    mnemonic: &'static str,
    operation: Operation,
    arguments: usize,
    f: fn(&[&str]) -> Result<Command, CommandError>,
) -> CatalogEntry {
    CatalogEntry {
        mnemonic,
        operation,
        arguments,
        template: Template::Build(f),
    }
}

/// Every command the ground can send.
pub static CATALOG: [CatalogEntry; 27] = [
    build("SetClock", Operation::SetClock, 6, set_clock),
    build("BeaconSp", Operation::BeaconSp, 1, beacon_sp),
    build("PicTimes", Operation::PicTimes, 6, pic_times),
    build("SSDVTimes", Operation::SsdvTimes, 6, ssdv_times),
    fixed("ClearPicTimes", Command::ClearPicTimes),
    fixed("UnsetClock", Command::UnsetClock),
    fixed("ReportT", Command::ReportT),
    fixed("GetPicTimes", Command::GetPicTimes),
    fixed("GetTelemetry", Command::GetTelemetry),
    fixed("GetPower", Command::GetPower),
    fixed("GetPhotos", Command::GetPhotos),
    fixed("GetComms", Command::GetComms),
    fixed("GetBeaconInterval", Command::GetBeaconInterval),
    fixed("NoOperate", Command::NoOperate),
    fixed("SendTestPacket", Command::SendTestPacket),
    fixed("PayComms", Command::PayComms),
    fixed("TweeSlee", Command::TweeSlee),
    fixed("Watchdog", Command::Watchdog),
    build("ModifyMode", Operation::ModifyMode, 1, mode),
    build("ModifyFrequency", Operation::ModifyFrequency, 1, modify_frequency),
    build("AdjustFrequency", Operation::AdjustFrequency, 1, adjust_frequency),
    build("TransmitCW", Operation::TransmitCw, 1, transmit_cw),
    build("BackgroundRSSI", Operation::BackgroundRssi, 1, background_rssi),
    fixed("CurrentRSSI", Command::CurrentRssi),
    build("SweepTransmitter", Operation::SweepTransmitter, 4, sweep_transmitter),
    build("SweepReceiver", Operation::SweepReceiver, 4, sweep_receiver),
    build("QueryRegister", Operation::QueryRegister, 1, query_register),
];

/// Digit widths of the fixed-width radio fields.
pub(crate) const FREQUENCY_DIGITS: usize = 9;
pub(crate) const DURATION_DIGITS: usize = 2;
pub(crate) const SWEEP_STEP_DIGITS: usize = 3;
pub(crate) const REGISTER_DIGITS: usize = 5;

/// Find the entry for a mnemonic (case-sensitive).
pub fn lookup(mnemonic: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.mnemonic == mnemonic)
}

/// Turn tokenised command text into exactly one command.
pub fn parse_command(tokens: Result<&[&str], ParseError>) -> Command {
    let tokens = match tokens {
        Ok(tokens) => tokens,
        Err(ParseError::Empty) => {
            warn!("CMD: empty command");
            return Command::Unknown;
        }
        Err(e) => {
            warn!("CMD: {e}");
            return Command::Invalid(e.into());
        }
    };

    let Some((&mnemonic, args)) = tokens.split_first() else {
        return Command::Unknown;
    };

    let Some(entry) = lookup(mnemonic) else {
        warn!("CMD: unknown mnemonic \"{mnemonic}\"");
        return Command::Unknown;
    };

    if args.len() != entry.arguments {
        warn!(
            "CMD: {mnemonic} takes {} arguments, got {}",
            entry.arguments,
            args.len()
        );
        return Command::Invalid(CommandError::Arity {
            expected: entry.arguments,
            received: args.len(),
        });
    }

    let result = match entry.template {
        Template::Fixed(command) => Ok(command),
        Template::Build(f) => f(args),
    };
    match result {
        Ok(command) => {
            debug!("CMD: built {:?}", command);
            command
        }
        Err(e) => {
            warn!("CMD: {mnemonic}: {e}");
            Command::Invalid(e)
        }
    }
}

/// Build a command into its pool slot.
pub fn build_command<'p>(
    tokens: Result<&[&str], ParseError>,
    pool: &'p mut CommandPool,
) -> PooledCommand<'p> {
    pool.load(parse_command(tokens))
}

// ── Argument parsers ─────────────────────────────────────────

/// Parse an all-digit argument; signs and spaces are rejected.
fn digits<T: core::str::FromStr>(arg: &str) -> Result<T, CommandError> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::NotDigits);
    }
    arg.parse().map_err(|_| CommandError::OutOfRange)
}

/// [`digits`] for a field the radio reads at a fixed width.
fn field<T: core::str::FromStr>(arg: &str, width: usize) -> Result<T, CommandError> {
    let value = digits(arg)?;
    if arg.len() > width {
        return Err(CommandError::OutOfRange);
    }
    Ok(value)
}

fn timestamp(args: &[&str]) -> Result<Timestamp, CommandError> {
    Ok(Timestamp {
        year: digits(args[0])?,
        month: digits(args[1])?,
        day: digits(args[2])?,
        hour: digits(args[3])?,
        minute: digits(args[4])?,
        second: digits(args[5])?,
    })
}

fn set_clock(args: &[&str]) -> Result<Command, CommandError> {
    timestamp(args).map(Command::SetClock)
}

fn beacon_sp(args: &[&str]) -> Result<Command, CommandError> {
    digits(args[0]).map(|seconds| Command::BeaconSp { seconds })
}

fn pic_times(args: &[&str]) -> Result<Command, CommandError> {
    timestamp(args).map(Command::PicTimes)
}

fn ssdv_times(args: &[&str]) -> Result<Command, CommandError> {
    timestamp(args).map(Command::SsdvTimes)
}

fn mode(args: &[&str]) -> Result<Command, CommandError> {
    let mut chars = args[0].chars();
    match (chars.next(), chars.next()) {
        (Some(mode), None) => Ok(Command::ModifyMode { mode }),
        _ => Err(CommandError::BadMode),
    }
}

fn modify_frequency(args: &[&str]) -> Result<Command, CommandError> {
    field(args[0], FREQUENCY_DIGITS).map(|hz| Command::ModifyFrequency { hz })
}

fn adjust_frequency(args: &[&str]) -> Result<Command, CommandError> {
    field(args[0], FREQUENCY_DIGITS).map(|hz| Command::AdjustFrequency { hz })
}

fn transmit_cw(args: &[&str]) -> Result<Command, CommandError> {
    field(args[0], DURATION_DIGITS).map(|seconds| Command::TransmitCw { seconds })
}

fn background_rssi(args: &[&str]) -> Result<Command, CommandError> {
    field(args[0], DURATION_DIGITS).map(|seconds| Command::BackgroundRssi { seconds })
}

fn sweep(args: &[&str]) -> Result<Sweep, CommandError> {
    Ok(Sweep {
        start_hz: field(args[0], FREQUENCY_DIGITS)?,
        stop_hz: field(args[1], FREQUENCY_DIGITS)?,
        steps: field(args[2], SWEEP_STEP_DIGITS)?,
        dwell_ms: field(args[3], SWEEP_STEP_DIGITS)?,
    })
}

fn sweep_transmitter(args: &[&str]) -> Result<Command, CommandError> {
    sweep(args).map(Command::SweepTransmitter)
}

fn sweep_receiver(args: &[&str]) -> Result<Command, CommandError> {
    sweep(args).map(Command::SweepReceiver)
}

fn query_register(args: &[&str]) -> Result<Command, CommandError> {
    field(args[0], REGISTER_DIGITS).map(|register| Command::QueryRegister { register })
}
