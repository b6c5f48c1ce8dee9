//! Local frames from the radio board: replies relayed to the ground,
//! housekeeping traffic dropped.

use super::mock_hw::{LoopbackSerial, MockBoards, local_frame, remote_frame};

use avionics::command::Operation;
use avionics::config::AvionicsConfig;
use avionics::link::processor::{CommandProcessor, Outcome};
use avionics::message::ResponseTag;

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

#[test]
fn status_reply_is_relayed_with_leading_spaces_trimmed() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &local_frame(b"RES\x09   RSSI -97"));

    assert_eq!(outcome, Some(Outcome::Relayed(ResponseTag::RadioStatus)));
    let frames = link.transport_mut().serial_mut().take_frames();
    assert_eq!(frames, [(0xAA, b"RES GRS RSSI -97".to_vec())]);
}

#[test]
fn relayed_reply_is_truncated() {
    let config = AvionicsConfig {
        radio_response_limit: 4,
        ..AvionicsConfig::default()
    };
    let (mut link, mut boards) = make_link(&config);

    deliver(&mut link, &mut boards, &local_frame(b"RES\x0Cmode-changed"));

    let texts = link.transport_mut().serial_mut().take_texts();
    assert_eq!(texts, ["RES RMM mode"]);
}

#[test]
fn radio_acknowledgements_are_not_relayed() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let ack = deliver(&mut link, &mut boards, &local_frame(b"ACK"));
    let nack = deliver(&mut link, &mut boards, &local_frame(b"NACK"));

    assert_eq!(ack, Some(Outcome::LocalIgnored));
    assert_eq!(nack, Some(Outcome::LocalIgnored));
    assert!(link.transport().serial().tx.is_empty());
    assert_eq!(link.stats().local_ignored, 2);
}

#[test]
fn reply_for_untagged_radio_command_is_dropped() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    // Halt (0x0A) never carries data back.
    let outcome = deliver(&mut link, &mut boards, &local_frame(b"RES\x0Aok"));

    assert_eq!(outcome, Some(Outcome::LocalIgnored));
    assert!(link.transport().serial().tx.is_empty());
}

#[test]
fn local_frames_count_as_ground_contact() {
    let config = AvionicsConfig::default();
    let window = config.ground_contact_window_ms();
    let (mut link, mut boards) = make_link(&config);
    let later = window + 1_000;
    assert!(!link.transport().recent_ground_contact(later, window));

    link.transport_mut()
        .serial_mut()
        .push(&local_frame(b"RES\x09status"));
    link.check_for_command(&mut boards, later);

    assert_eq!(link.transport().ms_since_ground_contact(later), 0);
    assert!(link.transport().recent_ground_contact(later, window));
}

#[test]
fn malformed_frame_does_not_count_as_ground_contact() {
    let config = AvionicsConfig::default();
    let window = config.ground_contact_window_ms();
    let (mut link, mut boards) = make_link(&config);
    let later = window + 1_000;

    // Unknown type byte: the frame never completes.
    link.transport_mut()
        .serial_mut()
        .push(&[0xC0, 0x55, b'x', 0xC0]);
    link.check_for_command(&mut boards, later);

    assert!(!link.transport().recent_ground_contact(later, window));
}

#[test]
fn mode_change_round_trip() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    deliver(&mut link, &mut boards, &remote_frame("ModifyMode 2"));
    let frames = link.transport_mut().serial_mut().take_frames();
    assert_eq!(frames[1], (0x0C, b"2".to_vec()));

    let outcome = deliver(&mut link, &mut boards, &local_frame(b"RES\x0C2"));
    assert_eq!(outcome, Some(Outcome::Relayed(ResponseTag::RadioModifyMode)));
    assert_eq!(link.transport_mut().serial_mut().take_texts(), ["RES RMM 2"]);
}

#[test]
fn frequency_change_round_trip() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &remote_frame("ModifyFrequency 433500000"));
    assert_eq!(
        outcome,
        Some(Outcome::Succeeded(Operation::ModifyFrequency))
    );
    let frames = link.transport_mut().serial_mut().take_frames();
    assert_eq!(frames[0], (0xAA, b"ACK 1".to_vec()));
    assert_eq!(frames[1], (0x0B, b"433500000".to_vec()));

    let outcome = deliver(&mut link, &mut boards, &local_frame(b"RES\x0B433500000"));
    assert_eq!(
        outcome,
        Some(Outcome::Relayed(ResponseTag::RadioModifyFrequency))
    );
    assert_eq!(
        link.transport_mut().serial_mut().take_texts(),
        ["RES RMF 433500000"]
    );
}

#[test]
fn radio_fields_are_zero_padded() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    deliver(&mut link, &mut boards, &remote_frame("AdjustFrequency 1200"));
    deliver(&mut link, &mut boards, &remote_frame("TransmitCW 5"));
    deliver(&mut link, &mut boards, &remote_frame("BackgroundRSSI 30"));
    deliver(&mut link, &mut boards, &remote_frame("CurrentRSSI"));
    deliver(&mut link, &mut boards, &remote_frame("QueryRegister 42"));

    let radio: Vec<(u8, Vec<u8>)> = link
        .transport_mut()
        .serial_mut()
        .take_frames()
        .into_iter()
        .filter(|(kind, _)| *kind != 0xAA)
        .collect();
    assert_eq!(
        radio,
        [
            (0x0D, b"000001200".to_vec()),
            (0x17, b"05".to_vec()),
            (0x18, b"30".to_vec()),
            (0x19, Vec::new()),
            (0x1C, b"00042".to_vec()),
        ]
    );
}

#[test]
fn sweep_fields_run_together() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(
        &mut link,
        &mut boards,
        &remote_frame("SweepReceiver 433000000 434000000 10 250"),
    );
    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::SweepReceiver)));
    let frames = link.transport_mut().serial_mut().take_frames();
    assert_eq!(frames[1], (0x1B, b"433000000434000000010250".to_vec()));

    deliver(&mut link, &mut boards, &local_frame(b"RES\x1Bdone"));
    assert_eq!(link.transport_mut().serial_mut().take_texts(), ["RES RSR done"]);
}

#[test]
fn radio_command_with_wrong_arity_is_nacked() {
    let (mut link, mut boards) = make_link(&AvionicsConfig::default());

    let outcome = deliver(&mut link, &mut boards, &remote_frame("CurrentRSSI 1"));

    assert_eq!(outcome, Some(Outcome::Failed(Operation::Invalid)));
    assert_eq!(link.transport_mut().serial_mut().take_texts(), ["NACK 1"]);
}
