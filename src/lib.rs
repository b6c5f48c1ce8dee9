//! CubeSat avionics command link.
//!
//! Exposes the uplink/downlink stack (KISS framing, signed command
//! validation, command dispatch, beacons) for the host simulator and for
//! integration testing.  Board access goes through the traits in
//! [`app::ports`]; nothing here touches hardware directly.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod beacon;
pub mod command;
pub mod config;
pub mod error;
pub mod link;
pub mod message;

