//! Ground uplink: serial bytes in, ACK/NACK and responses out.

use super::mock_hw::{BoardCall, LoopbackSerial, MockBoards, remote_frame};

use avionics::adapters::ground::GroundStation;
use avionics::command::{Operation, Timestamp};
use avionics::config::AvionicsConfig;
use avionics::error::AuthError;
use avionics::link::auth::sign_command;
use avionics::link::kiss::{FrameKind, encode_frame};
use avionics::link::processor::{CommandProcessor, Outcome};
use avionics::link::transport::FrameTransport;

const SALT: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

fn make_link(config: &AvionicsConfig) -> (CommandProcessor<LoopbackSerial>, MockBoards) {
    (
        CommandProcessor::new(LoopbackSerial::new(), config),
        MockBoards::new(),
    )
}

fn deliver(
    link: &mut CommandProcessor<LoopbackSerial>,
    boards: &mut MockBoards,
    bytes: &[u8],
) -> Option<Outcome> {
    link.transport_mut().serial_mut().push(bytes);
    link.check_for_command(boards, 0)
}

fn downlink(link: &mut CommandProcessor<LoopbackSerial>) -> Vec<String> {
    link.transport_mut().serial_mut().take_texts()
}

fn signed_frame(seq: u32, command: &str) -> Vec<u8> {
    let secret = AvionicsConfig::default().secret;
    let text = sign_command(&secret, seq, &SALT, command).unwrap();
    encode_frame(FrameKind::Remote.type_byte(), text.as_bytes(), true)
        .unwrap()
        .to_vec()
}

// ── Unsigned commands ─────────────────────────────────────────

#[test]
fn no_operate_is_acknowledged_then_answered() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &remote_frame("NoOperate"));

    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::NoOperate)));
    assert_eq!(downlink(&mut link), ["ACK 1", "RES NOP"]);
    assert!(boards.calls.is_empty());
}

#[test]
fn beacon_interval_reaches_the_avionics_board() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &remote_frame("BeaconSp 120"));

    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::BeaconSp)));
    assert_eq!(boards.calls, [BoardCall::SetBeaconInterval(120)]);
    assert_eq!(downlink(&mut link), ["ACK 1", "RES SBI"]);
}

#[test]
fn bad_argument_is_nacked_without_board_call() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &remote_frame("BeaconSp abc"));

    assert_eq!(outcome, Some(Outcome::Failed(Operation::Invalid)));
    assert!(boards.calls.is_empty());
    assert_eq!(downlink(&mut link), ["NACK 1"]);
}

#[test]
fn unknown_mnemonic_is_nacked() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &remote_frame("Frobnicate"));

    assert_eq!(outcome, Some(Outcome::Failed(Operation::Unknown)));
    assert_eq!(downlink(&mut link), ["NACK 1"]);
}

#[test]
fn too_many_tokens_is_invalid() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &remote_frame("SetClock 1 2 3 4 5 6 7 8 9 10"));

    assert_eq!(outcome, Some(Outcome::Failed(Operation::Invalid)));
    assert_eq!(downlink(&mut link), ["NACK 1"]);
}

#[test]
fn set_clock_then_report_time() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());
    let time = Timestamp {
        year: 2024,
        month: 3,
        day: 9,
        hour: 7,
        minute: 5,
        second: 0,
    };

    deliver(&mut link, &mut boards, &remote_frame("SetClock 2024 3 9 7 5 0"));
    deliver(&mut link, &mut boards, &remote_frame("ReportT"));

    assert_eq!(boards.calls, [BoardCall::SetClock(time)]);
    assert_eq!(
        downlink(&mut link),
        ["ACK 1", "RES SRC", "ACK 1", "RES GRC 2024-03-09T07:05:00"]
    );
}

#[test]
fn board_refusal_reports_err() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());
    boards.refuse = true;

    let outcome = deliver(&mut link, &mut boards, &remote_frame("ClearPicTimes"));

    assert_eq!(outcome, Some(Outcome::Failed(Operation::ClearPicTimes)));
    assert_eq!(boards.calls, [BoardCall::ClearPictureTimes]);
    assert_eq!(downlink(&mut link), ["ACK 1", "RES ERR"]);
}

#[test]
fn missing_report_is_err() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());
    boards.photos = None;

    deliver(&mut link, &mut boards, &remote_frame("GetPhotos"));

    assert_eq!(downlink(&mut link), ["ACK 1", "RES ERR"]);
}

#[test]
fn tweeslee_powers_down_and_halts_radio() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    deliver(&mut link, &mut boards, &remote_frame("TweeSlee"));

    assert_eq!(boards.calls, [BoardCall::PowerDown]);
    let frames = link.transport_mut().serial_mut().take_frames();
    let kinds: Vec<u8> = frames.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds, [0xAA, 0xAA, 0x0A]);
    assert_eq!(frames[1].1, b"RES TSL");
}

#[test]
fn watchdog_command_forces_reset_after_reporting() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &remote_frame("Watchdog"));

    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::Watchdog)));
    assert_eq!(boards.last_call(), Some(&BoardCall::ForceReset));
    assert_eq!(downlink(&mut link), ["ACK 1", "RES WDG"]);
}

#[test]
fn get_comms_asks_the_radio() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    deliver(&mut link, &mut boards, &remote_frame("GetComms"));

    let frames = link.transport_mut().serial_mut().take_frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1], (0x09, Vec::new()));
}

#[test]
fn non_utf8_frame_is_nacked() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &[0xC0, 0xAA, 0xFF, 0xFE, 0xC0]);

    assert_eq!(outcome, Some(Outcome::Failed(Operation::Invalid)));
    assert_eq!(downlink(&mut link), ["NACK 1"]);
}

#[test]
fn two_frames_are_handled_one_per_call() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());
    let mut bytes = remote_frame("NoOperate");
    bytes.extend(remote_frame("GetBeaconInterval"));

    let first = deliver(&mut link, &mut boards, &bytes);
    let second = link.check_for_command(&mut boards, 0);

    assert_eq!(first, Some(Outcome::Succeeded(Operation::NoOperate)));
    assert_eq!(second, Some(Outcome::Succeeded(Operation::GetBeaconInterval)));
    assert_eq!(link.check_for_command(&mut boards, 0), None);
    assert_eq!(
        downlink(&mut link),
        ["ACK 1", "RES NOP", "ACK 1", "RES GBI 0"]
    );
}

// ── Framing ───────────────────────────────────────────────────

#[test]
fn escaped_fend_decodes_to_literal_byte() {
    let config = AvionicsConfig::default();
    let mut transport = FrameTransport::new(LoopbackSerial::new(), &config);
    transport
        .serial_mut()
        .push(&[0xC0, 0xAA, b'a', 0xDB, 0xDC, b'b', 0xC0]);

    let frame = transport.poll(0).unwrap();

    assert_eq!(frame.kind, FrameKind::Remote);
    assert_eq!(frame.payload.as_slice(), [b'a', 0xC0, b'b']);
}

#[test]
fn garbage_before_frame_is_ignored() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());
    let mut bytes = b"noise without a delimiter".to_vec();
    bytes.extend(remote_frame("NoOperate"));

    let outcome = deliver(&mut link, &mut boards, &bytes);

    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::NoOperate)));
}

// ── Signed commands ───────────────────────────────────────────

#[test]
fn signed_command_acks_transmitted_sequence() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &signed_frame(1, "NoOperate"));

    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::NoOperate)));
    assert_eq!(downlink(&mut link), ["ACK 1", "RES NOP"]);
    assert_eq!(link.expected_sequence(), 2);
}

#[test]
fn replayed_sequence_is_rejected() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    deliver(&mut link, &mut boards, &signed_frame(1, "NoOperate"));
    downlink(&mut link);
    let replay = deliver(&mut link, &mut boards, &signed_frame(1, "NoOperate"));

    assert_eq!(
        replay,
        Some(Outcome::Rejected(AuthError::SequenceMismatch {
            expected: 2,
            received: 1
        }))
    );
    assert!(downlink(&mut link).is_empty(), "no reply to a rejected frame");
    assert_eq!(link.expected_sequence(), 2);
}

#[test]
fn consecutive_sequences_are_accepted() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());
    let mut ground = GroundStation::new(AvionicsConfig::default().secret, 1);

    let first = deliver(&mut link, &mut boards, &ground.uplink("NoOperate").unwrap());
    let second = deliver(&mut link, &mut boards, &ground.uplink("BeaconSp 120").unwrap());

    assert_eq!(first, Some(Outcome::Succeeded(Operation::NoOperate)));
    assert_eq!(second, Some(Outcome::Succeeded(Operation::BeaconSp)));
    assert_eq!(link.expected_sequence(), 3);
    assert_eq!(
        downlink(&mut link),
        ["ACK 1", "RES NOP", "ACK 2", "RES SBI"]
    );
}

#[test]
fn forged_mac_is_dropped_silently() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());
    let mut ground = GroundStation::new(*b"not-the-real-key", 1);

    let outcome = deliver(&mut link, &mut boards, &ground.uplink("Watchdog").unwrap());

    assert_eq!(outcome, Some(Outcome::Rejected(AuthError::BadMac)));
    assert!(boards.calls.is_empty());
    assert!(downlink(&mut link).is_empty());
    assert_eq!(link.expected_sequence(), 1);
    assert_eq!(link.stats().rejected, 1);
}

#[test]
fn advisory_mode_executes_forged_command() {
    let config = AvionicsConfig {
        validation_required: false,
        ..AvionicsConfig::default()
    };
    let (mut link, mut boards) = make_link(&config);
    let mut ground = GroundStation::new(*b"not-the-real-key", 7);

    let outcome = deliver(&mut link, &mut boards, &ground.uplink("NoOperate").unwrap());

    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::NoOperate)));
    assert_eq!(downlink(&mut link), ["ACK 7", "RES NOP"]);
    assert_eq!(link.expected_sequence(), 1, "mismatched sequence never advances");
}

#[test]
fn link_and_pool_counters_follow_traffic() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    deliver(&mut link, &mut boards, &remote_frame("NoOperate"));
    let outcome = deliver(&mut link, &mut boards, &[0xC0, 0x55, b'x', 0xC0]);
    assert_eq!(outcome, None);

    let stats = link.link_stats();
    assert_eq!(stats.frames_received, 1);
    assert_eq!(stats.frames_dropped, 1);
    assert_eq!(stats.messages_sent, 2);
    assert_eq!(stats.send_failures, 0);
    assert_eq!(link.pool().loads(), 1);
    assert_eq!(link.pool().in_use(), None);
}
