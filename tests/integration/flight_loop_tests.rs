//! Flight loop: watchdog servicing, beacon timing, uplink in one tick.

use super::mock_hw::{LoopbackSerial, MockBoards, local_frame, remote_frame};

use avionics::app::service::FlightLoop;
use avionics::beacon::{PayloadBeacon, PowerBeacon};
use avionics::command::Operation;
use avionics::config::AvionicsConfig;
use avionics::link::processor::Outcome;

const BEACON_TYPE: u8 = 0x07;

fn make_loop(config: &AvionicsConfig) -> (FlightLoop<LoopbackSerial>, MockBoards) {
    let mut boards = MockBoards::new();
    boards.beacon_interval = 60;
    (FlightLoop::new(LoopbackSerial::new(), config), boards)
}

fn beacons(flight: &mut FlightLoop<LoopbackSerial>) -> Vec<Vec<u8>> {
    flight
        .processor_mut()
        .transport_mut()
        .serial_mut()
        .take_frames()
        .into_iter()
        .filter(|(kind, _)| *kind == BEACON_TYPE)
        .map(|(_, content)| content)
        .collect()
}

#[test]
fn every_tick_services_the_watchdog() {
    let (mut flight, mut boards) = make_loop(&AvionicsConfig::default());

    for t in 0..5 {
        flight.tick(&mut boards, t * 10);
    }

    assert_eq!(boards.services, 5);
    assert_eq!(flight.tick_count(), 5);
}

#[test]
fn beacon_sent_once_interval_has_elapsed() {
    let (mut flight, mut boards) = make_loop(&AvionicsConfig::default());

    flight.tick(&mut boards, 0);
    flight.tick(&mut boards, 60_000);
    assert!(beacons(&mut flight).is_empty(), "interval must be exceeded");

    flight.tick(&mut boards, 60_001);
    assert_eq!(beacons(&mut flight), [b"SEE".to_vec()]);
    assert_eq!(flight.beacons_sent(), 1);
}

#[test]
fn beacon_reports_board_health() {
    let (mut flight, mut boards) = make_loop(&AvionicsConfig::default());
    boards.power = PowerBeacon::Poor;
    boards.payload = PayloadBeacon::Communicate { minute: 0 };
    boards.clock = None;

    flight.tick(&mut boards, 0);
    flight.tick(&mut boards, 60_001);

    assert_eq!(beacons(&mut flight), [b"TEI".to_vec()]);
}

#[test]
fn interval_change_restarts_timer() {
    let (mut flight, mut boards) = make_loop(&AvionicsConfig::default());

    flight.tick(&mut boards, 0);
    boards.beacon_interval = 120;
    flight.tick(&mut boards, 50_000);
    flight.tick(&mut boards, 120_001);
    assert!(beacons(&mut flight).is_empty());

    flight.tick(&mut boards, 170_001);
    assert_eq!(flight.beacons_sent(), 1);
}

#[test]
fn zero_interval_disables_beacon() {
    let (mut flight, mut boards) = make_loop(&AvionicsConfig::default());
    boards.beacon_interval = 0;

    for t in 0..10 {
        flight.tick(&mut boards, t * 600_000);
    }

    assert_eq!(flight.beacons_sent(), 0);
}

#[test]
fn quiet_period_skips_beacon_but_restarts_timer() {
    let (mut flight, mut boards) = make_loop(&AvionicsConfig::default());
    boards.beacon_permitted = false;

    flight.tick(&mut boards, 0);
    flight.tick(&mut boards, 60_001);
    assert_eq!(flight.beacons_sent(), 0);

    boards.beacon_permitted = true;
    flight.tick(&mut boards, 100_000);
    assert_eq!(flight.beacons_sent(), 0, "timer restarted at 60 001");

    flight.tick(&mut boards, 120_002);
    assert_eq!(flight.beacons_sent(), 1);
}

#[test]
fn beacon_stops_without_ground_contact_and_resumes_after_uplink() {
    let config = AvionicsConfig {
        ground_contact_window_secs: 100,
        ..AvionicsConfig::default()
    };
    let (mut flight, mut boards) = make_loop(&config);

    flight.tick(&mut boards, 0);
    flight.tick(&mut boards, 60_001);
    assert_eq!(flight.beacons_sent(), 1);

    flight.tick(&mut boards, 120_002);
    assert_eq!(flight.beacons_sent(), 1, "ground silent for over 100 s");

    flight
        .processor_mut()
        .transport_mut()
        .serial_mut()
        .push(&remote_frame("NoOperate"));
    let outcome = flight.tick(&mut boards, 130_000);
    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::NoOperate)));

    flight.tick(&mut boards, 130_001);
    assert_eq!(flight.beacons_sent(), 2);
}

#[test]
fn radio_traffic_keeps_beacon_alive() {
    let config = AvionicsConfig {
        ground_contact_window_secs: 100,
        ..AvionicsConfig::default()
    };
    let (mut flight, mut boards) = make_loop(&config);

    flight.tick(&mut boards, 0);
    flight
        .processor_mut()
        .transport_mut()
        .serial_mut()
        .push(&local_frame(b"ACK"));
    let outcome = flight.tick(&mut boards, 50_000);
    assert_eq!(outcome, Some(Outcome::LocalIgnored));

    flight.tick(&mut boards, 60_001);
    assert_eq!(flight.beacons_sent(), 1);

    flight.tick(&mut boards, 120_002);
    assert_eq!(flight.beacons_sent(), 2, "radio frame at 50 s is contact");
}

#[test]
fn uplink_is_processed_in_the_same_tick() {
    let (mut flight, mut boards) = make_loop(&AvionicsConfig::default());
    flight
        .processor_mut()
        .transport_mut()
        .serial_mut()
        .push(&remote_frame("BeaconSp 300"));

    let outcome = flight.tick(&mut boards, 0);

    assert_eq!(outcome, Some(Outcome::Succeeded(Operation::BeaconSp)));
    assert_eq!(boards.beacon_interval, 300);
    assert_eq!(flight.command_stats().successful, 1);
}
