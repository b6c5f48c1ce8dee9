//! Command processor: one non-blocking step of the uplink.
//!
//! Every call to [`CommandProcessor::check_for_command`] polls the serial
//! port once.  If that completes a frame, the frame is handled to the end
//! before returning:
//!
//! 1. **Remote frames** pass through signature validation, tokenising,
//!    the command factory, acknowledgement and, if acknowledged,
//!    execution.  Authentication failures are dropped silently (no NACK
//!    goes to an unauthenticated sender).
//! 2. **Local frames** come from the radio.  Its `RES<type><data>` replies
//!    are relayed to the ground under the matching tag; its own ACK/NACK
//!    traffic is only logged.

use log::{debug, info, warn};

use crate::app::ports::Boards;
use crate::command::{Command, CommandPool, Operation, build_command};
use crate::config::AvionicsConfig;
use crate::error::{AuthError, CommandError};
use crate::message::{RadioCommand, Response, ResponseTag};

use super::auth::SignatureValidator;
use super::kiss::{Frame, FrameKind};
use super::parser::tokenize;
use super::transport::{FrameTransport, LinkStats, MessageSink, SerialPort};

/// What one tick did with the frame it found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Acknowledged and executed successfully.
    Succeeded(Operation),
    /// NACKed, not acknowledged, or failed in execution.
    Failed(Operation),
    /// Dropped by signature validation.
    Rejected(AuthError),
    /// A radio reply relayed to the ground.
    Relayed(ResponseTag),
    /// A local frame that was logged and dropped.
    LocalIgnored,
}

/// Process-lifetime command counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandStats {
    pub successful: u32,
    pub failed: u32,
    pub rejected: u32,
    pub relayed: u32,
    pub local_ignored: u32,
}

pub struct CommandProcessor<S: SerialPort> {
    transport: FrameTransport<S>,
    validator: SignatureValidator,
    pool: CommandPool,
    stats: CommandStats,
    radio_response_limit: usize,
}

impl<S: SerialPort> CommandProcessor<S> {
    pub fn new(serial: S, config: &AvionicsConfig) -> Self {
        Self {
            transport: FrameTransport::new(serial, config),
            validator: SignatureValidator::from_config(config),
            pool: CommandPool::new(),
            stats: CommandStats::default(),
            radio_response_limit: config.radio_response_limit,
        }
    }

    /// Handle at most one inbound frame.  `None` if no frame was complete.
    pub fn check_for_command(&mut self, boards: &mut impl Boards, now_ms: u64) -> Option<Outcome> {
        let frame = self.transport.poll(now_ms)?;
        let outcome = match frame.kind {
            FrameKind::Remote => self.process_remote(&frame, boards),
            FrameKind::Local => self.process_local(&frame),
        };
        self.record(outcome);
        Some(outcome)
    }

    fn process_remote(&mut self, frame: &Frame, boards: &mut impl Boards) -> Outcome {
        let Ok(text) = core::str::from_utf8(&frame.payload) else {
            // Cannot authenticate what cannot be read; answer as Invalid.
            warn!("CMD: remote frame is not UTF-8");
            let sequence = self.validator.expected_sequence();
            let command = self
                .pool
                .load(Command::Invalid(CommandError::Unparseable));
            command.acknowledge_command(&mut self.transport, sequence);
            return Outcome::Failed(command.operation());
        };

        let auth = match self.validator.validate(text) {
            Ok(auth) => auth,
            Err(e) => {
                warn!("CMD: command rejected: {e}");
                return Outcome::Rejected(e);
            }
        };

        let tokens = tokenize(auth.command);
        let command = build_command(tokens.as_deref().map_err(|e| *e), &mut self.pool);
        let operation = command.operation();

        let acknowledged = command.acknowledge_command(&mut self.transport, auth.sequence);
        let executed = acknowledged && command.execute_command(&mut self.transport, boards);

        if executed {
            info!("CMD[{}]: {:?} succeeded", auth.sequence, operation);
            Outcome::Succeeded(operation)
        } else {
            warn!("CMD[{}]: {:?} failed", auth.sequence, operation);
            Outcome::Failed(operation)
        }
    }

    fn process_local(&mut self, frame: &Frame) -> Outcome {
        let payload = frame.payload.as_slice();

        if payload.starts_with(b"ACK") || payload.starts_with(b"NACK") {
            debug!(
                "CMD: radio says {}",
                core::str::from_utf8(payload).unwrap_or("<binary>")
            );
            return Outcome::LocalIgnored;
        }

        let Some(rest) = payload.strip_prefix(b"RES") else {
            warn!("CMD: unrecognised local frame ({} bytes)", payload.len());
            return Outcome::LocalIgnored;
        };
        let Some((&type_byte, data)) = rest.split_first() else {
            warn!("CMD: radio response without type");
            return Outcome::LocalIgnored;
        };
        let Some(tag) = RadioCommand::from_type_byte(type_byte).and_then(RadioCommand::response_tag)
        else {
            warn!("CMD: radio response for unknown type 0x{type_byte:02X}");
            return Outcome::LocalIgnored;
        };
        let Ok(data) = core::str::from_utf8(data) else {
            warn!("CMD: radio response {tag} is not text");
            return Outcome::LocalIgnored;
        };

        let data = truncate(data.trim_start_matches(' '), self.radio_response_limit);
        debug!("CMD: relaying radio response {tag}");
        if !self
            .transport
            .send(&Response::with_data(tag, data).to_message())
        {
            warn!("CMD: relay of {tag} failed");
        }
        Outcome::Relayed(tag)
    }

    fn record(&mut self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Succeeded(_) => &mut self.stats.successful,
            Outcome::Failed(_) => &mut self.stats.failed,
            Outcome::Rejected(_) => &mut self.stats.rejected,
            Outcome::Relayed(_) => &mut self.stats.relayed,
            Outcome::LocalIgnored => &mut self.stats.local_ignored,
        };
        *counter = counter.wrapping_add(1);
    }

    pub fn stats(&self) -> CommandStats {
        self.stats
    }

    pub fn link_stats(&self) -> LinkStats {
        self.transport.stats()
    }

    pub fn pool(&self) -> &CommandPool {
        &self.pool
    }

    pub fn expected_sequence(&self) -> u32 {
        self.validator.expected_sequence()
    }

    pub fn transport(&self) -> &FrameTransport<S> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut FrameTransport<S> {
        &mut self.transport
    }
}

/// Cut `s` to at most `limit` bytes on a char boundary.
fn truncate(s: &str, limit: usize) -> &str {
    if s.len() <= limit {
        return s;
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
