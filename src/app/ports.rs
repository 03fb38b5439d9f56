//! Listener ports: the boundary between the port managers and whoever
//! consumes their events.
//!
//! ```text
//!   InputPortManager ──▶ PortEventSink + FaultSink ──▶ caller
//!   OutputPortManager ─▶ FaultSink ──────────────────▶ caller
//! ```
//!
//! The caller owns the listener and hands it (or a `&mut` borrow of it)
//! to a manager at construction.  Health is pull-based: managers answer
//! [`HealthReport`] queries, they never push health.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::addressing::LogicalPort;
use crate::config::{MAX_INPUT_DEVICES, MAX_OUTPUT_DEVICES};
use crate::error::FaultReason;

/// Capacity of a health report; covers either device family.
pub const MAX_REPORTED_DEVICES: usize = if MAX_INPUT_DEVICES > MAX_OUTPUT_DEVICES {
    MAX_INPUT_DEVICES
} else {
    MAX_OUTPUT_DEVICES
};

// ───────────────────────────────────────────────────────────────
// Event ports
// ───────────────────────────────────────────────────────────────

/// Receives classified input transitions.
pub trait PortEventSink {
    /// A channel left its rest state for the short (`long_press == false`)
    /// or long (`long_press == true`) threshold.
    fn on_port_event(&mut self, port: LogicalPort, long_press: bool);
}

/// Receives device faults from either manager.
pub trait FaultSink {
    /// `address` is 0 for a configuration fault that disabled the whole
    /// subsystem.
    fn on_device_fault(&mut self, address: u8, reason: FaultReason);
}

impl<T: PortEventSink + ?Sized> PortEventSink for &mut T {
    fn on_port_event(&mut self, port: LogicalPort, long_press: bool) {
        (**self).on_port_event(port, long_press);
    }
}

impl<T: FaultSink + ?Sized> FaultSink for &mut T {
    fn on_device_fault(&mut self, address: u8, reason: FaultReason) {
        (**self).on_device_fault(address, reason);
    }
}

// ───────────────────────────────────────────────────────────────
// Health
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHealth {
    pub address: u8,
    pub enabled: bool,
}

/// Bus status of every configured device of one family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub devices: Vec<DeviceHealth, MAX_REPORTED_DEVICES>,
}

impl HealthReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, address: u8, enabled: bool) {
        // Capacity matches the largest device family.
        let _ = self.devices.push(DeviceHealth { address, enabled });
    }

    pub fn count(&self) -> usize {
        self.devices.len()
    }

    pub fn all_enabled(&self) -> bool {
        self.devices.iter().all(|d| d.enabled)
    }

    /// Addresses of devices that have been taken offline.
    pub fn disabled(&self) -> impl Iterator<Item = u8> + '_ {
        self.devices.iter().filter(|d| !d.enabled).map(|d| d.address)
    }

    pub fn get(&self, address: u8) -> Option<DeviceHealth> {
        self.devices.iter().find(|d| d.address == address).copied()
    }
}
