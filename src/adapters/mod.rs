//! Adapters: concrete implementations of the port traits for the host.
//!
//! | Adapter     | Implements          | Connects to                  |
//! |-------------|---------------------|------------------------------|
//! | `simulated` | ClockPort           | In-memory RTC                |
//! |             | AvionicsPort        | In-memory schedule / beacon  |
//! |             | PowerPort           | Fixed power readings         |
//! |             | PayloadPort         | In-memory payload state      |
//! |             | WatchdogPort        | Reset flag                   |
//! | `stdio`     | SerialPort          | stdin / stdout               |
//! | `time`      | (none)              | `std::time::Instant`         |
//! | `ground`    | (none)              | Ground-side signer / framer  |

pub mod ground;
pub mod simulated;
pub mod stdio;
pub mod time;
