//! Command uplink and telemetry downlink.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Link Stack                            │
//! │                                                              │
//! │  ┌────────────┐   ┌──────────┐   ┌──────────┐   ┌─────────┐  │
//! │  │ SerialPort │──▶│   KISS   │──▶│   Auth   │──▶│ Parser  │  │
//! │  │  (trait)   │   │ (framing)│   │  (HMAC)  │   │ (tokens)│  │
//! │  └────────────┘   └──────────┘   └──────────┘   └────┬────┘  │
//! │        ▲                                             │       │
//! │        │                                             ▼       │
//! │  ┌────────────┐                       ┌──────────────────┐   │
//! │  │ SerialPort │◀── ACK / RES ─────────│ CommandProcessor │   │
//! │  │  (write)   │                       │  → command pool  │   │
//! │  └────────────┘                       └──────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod kiss;
pub mod parser;
pub mod processor;
pub mod transport;
