//! Acknowledge-then-execute.
//!
//! The processor always calls [`Command::acknowledge_command`] first and
//! only calls [`Command::execute_command`] if the acknowledgement went out.
//! Execution makes exactly one collaborator call and reports the outcome
//! as `RES <TAG>[ <data>]`, or `RES ERR` when the collaborator refused.

use log::{info, warn};

use super::catalog::{DURATION_DIGITS, FREQUENCY_DIGITS, REGISTER_DIGITS, SWEEP_STEP_DIGITS};
use super::{Command, Sweep};
use crate::app::ports::Boards;
use crate::link::transport::MessageSink;
use crate::message::{Message, MessageKind, RadioCommand, Response, ResponseTag};

impl Command {
    /// Send `ACK <sequence>`, or `NACK <sequence>` for Invalid / Unknown.
    ///
    /// Returns `false` if the command must not be executed.
    pub fn acknowledge_command(&self, link: &mut impl MessageSink, sequence: u32) -> bool {
        if self.is_rejected() {
            warn!("CMD: NACK {sequence} ({:?})", self);
            // The NACK is best-effort; a rejected command never executes.
            let _ = link.send(&Message::negative_acknowledgement(sequence));
            return false;
        }
        info!("CMD: ACK {sequence} {:?}", self.operation());
        link.send(&Message::acknowledgement(sequence))
    }

    /// Carry out the command.  `true` if the collaborator and every send succeeded.
    pub fn execute_command(&self, link: &mut impl MessageSink, boards: &mut impl Boards) -> bool {
        match *self {
            Self::SetClock(time) => {
                let ok = boards.set_clock(time);
                respond(link, ok, ResponseTag::SetClock)
            }
            Self::BeaconSp { seconds } => {
                let ok = boards.set_beacon_interval(seconds);
                respond(link, ok, ResponseTag::BeaconInterval)
            }
            Self::PicTimes(time) => {
                let ok = boards.add_picture_time(time);
                respond(link, ok, ResponseTag::PictureTime)
            }
            Self::SsdvTimes(time) => {
                let ok = boards.add_ssdv_time(time);
                respond(link, ok, ResponseTag::SsdvTime)
            }
            Self::ClearPicTimes => {
                let ok = boards.clear_picture_times();
                respond(link, ok, ResponseTag::ClearPictureTimes)
            }
            Self::UnsetClock => {
                let ok = boards.unset_clock();
                respond(link, ok, ResponseTag::UnsetClock)
            }
            Self::ReportT => {
                let time = boards.clock_time();
                respond_with(link, ResponseTag::ReportTime, time)
            }
            Self::GetPicTimes => {
                let report = boards.picture_times();
                respond_with(link, ResponseTag::PictureTimes, report)
            }
            Self::GetTelemetry => {
                let report = boards.telemetry();
                respond_with(link, ResponseTag::Telemetry, report)
            }
            Self::GetPower => {
                let report = boards.power_detail();
                respond_with(link, ResponseTag::Power, report)
            }
            Self::GetPhotos => {
                let count = boards.photo_count();
                respond_with(link, ResponseTag::Photos, count)
            }
            Self::GetBeaconInterval => {
                let seconds = boards.beacon_interval();
                respond_with(link, ResponseTag::GetBeaconInterval, Some(seconds))
            }
            Self::NoOperate => respond(link, true, ResponseTag::NoOperate),
            Self::SendTestPacket => {
                respond_with(link, ResponseTag::TestPacket, Some("test packet"))
            }
            Self::PayComms => {
                let ok = boards.communicate();
                respond(link, ok, ResponseTag::PayloadComms)
            }
            // Radio commands: the radio answers with a local frame, which the
            // processor relays.
            Self::GetComms => link.send(&Message::radio(RadioCommand::GetStatus, "")),
            Self::ModifyMode { mode } => {
                let mut buf = [0u8; 4];
                link.send(&Message::radio(RadioCommand::ModifyMode, mode.encode_utf8(&mut buf)))
            }
            Self::ModifyFrequency { hz } => {
                radio_field(link, RadioCommand::ModifyFrequency, hz, FREQUENCY_DIGITS)
            }
            Self::AdjustFrequency { hz } => {
                radio_field(link, RadioCommand::AdjustFrequency, hz, FREQUENCY_DIGITS)
            }
            Self::TransmitCw { seconds } => {
                radio_field(link, RadioCommand::TransmitCw, seconds, DURATION_DIGITS)
            }
            Self::BackgroundRssi { seconds } => {
                radio_field(link, RadioCommand::BackgroundRssi, seconds, DURATION_DIGITS)
            }
            Self::CurrentRssi => link.send(&Message::radio(RadioCommand::CurrentRssi, "")),
            Self::SweepTransmitter(sweep) => {
                radio_sweep(link, RadioCommand::SweepTransmitter, sweep)
            }
            Self::SweepReceiver(sweep) => radio_sweep(link, RadioCommand::SweepReceiver, sweep),
            Self::QueryRegister { register } => {
                radio_field(link, RadioCommand::QueryRegister, register, REGISTER_DIGITS)
            }
            Self::TweeSlee => {
                // Report first: after the halt the radio stops transmitting.
                let sent = respond(link, true, ResponseTag::TweeSlee);
                let powered_down = boards.power_down();
                if !powered_down {
                    warn!("CMD: payload did not power down");
                }
                let halted = link.send(&Message::radio(RadioCommand::Halt, ""));
                sent && powered_down && halted
            }
            Self::Watchdog => {
                // Report first: the reset ends this process.
                let sent = respond(link, true, ResponseTag::Watchdog);
                boards.force_reset();
                sent
            }
            Self::Invalid(_) | Self::Unknown => false,
        }
    }
}

/// Hand the radio one zero-padded numeric field.
fn radio_field(
    link: &mut impl MessageSink,
    command: RadioCommand,
    value: impl core::fmt::Display,
    width: usize,
) -> bool {
    link.send(&Message::formatted(
        MessageKind::Radio(command),
        format_args!("{value:0width$}"),
    ))
}

/// Start, stop, steps and dwell, each zero-padded and run together.
fn radio_sweep(link: &mut impl MessageSink, command: RadioCommand, sweep: Sweep) -> bool {
    let Sweep {
        start_hz,
        stop_hz,
        steps,
        dwell_ms,
    } = sweep;
    link.send(&Message::formatted(
        MessageKind::Radio(command),
        format_args!(
            "{start_hz:0f$}{stop_hz:0f$}{steps:0s$}{dwell_ms:0s$}",
            f = FREQUENCY_DIGITS,
            s = SWEEP_STEP_DIGITS,
        ),
    ))
}

/// `RES <tag>` on success, `RES ERR` otherwise.
fn respond(link: &mut impl MessageSink, ok: bool, tag: ResponseTag) -> bool {
    let response = if ok {
        Response::new(tag)
    } else {
        warn!("CMD: {} failed", tag);
        Response::error()
    };
    link.send(&response.to_message()) && ok
}

/// `RES <tag> <data>` when the collaborator produced data, `RES ERR` otherwise.
fn respond_with<T: core::fmt::Display>(
    link: &mut impl MessageSink,
    tag: ResponseTag,
    data: Option<T>,
) -> bool {
    match data {
        Some(data) => link.send(&Response::with_data(tag, data).to_message()),
        None => {
            warn!("CMD: {} failed", tag);
            // The command failed whether or not the ERR made it out.
            let _ = link.send(&Response::error().to_message());
            false
        }
    }
}
