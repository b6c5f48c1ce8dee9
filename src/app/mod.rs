//! Flight loop core: protocol orchestration, zero direct I/O.
//!
//! All interaction with the boards happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real hardware.

pub mod ports;
pub mod service;
