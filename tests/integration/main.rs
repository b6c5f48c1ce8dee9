//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock boards and an in-memory serial loopback.  All tests run
//! on the host with no radio or flight hardware required.

mod flight_loop_tests;
mod radio_relay_tests;
mod uplink_tests;
