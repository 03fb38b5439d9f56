//! Port I/O management for multi-port access-control panels.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.
//!
//! ```text
//!   InterruptLines ─┐
//!   I2c bus ────────┼─▶ InputPortManager ──▶ PortEventSink / FaultSink
//!                   └─▶ OutputPortManager ─▶ FaultSink
//!                              ▲
//!                     set_port_value(port, %)
//! ```

#![deny(unused_must_use)]

pub mod addressing;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod inputs;
pub mod outputs;
pub mod profiles;

pub mod adapters;
pub mod drivers;

#[cfg(test)]
mod testing;
