//! Port address maps.
//!
//! Translates between chip-addressed, bit-indexed hardware and the stable
//! logical numbering printed on the panel:
//!
//! ```text
//!   input:  (device, bit) ──▶ (port + device offset, channel)
//!   output: (device, pin) ◀─▶ port
//! ```
//!
//! Both maps are validated total and collision-free when built, so lookups
//! never have to handle an inconsistent table at runtime.

use core::fmt;

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::config::{
    InputProfile, MAX_INPUT_DEVICES, MAX_OUTPUT_CHANNELS, MAX_OUTPUT_DEVICES, MAX_PINS_PER_DEVICE,
    OutputProfile,
};
use crate::error::ConfigError;

/// A physical terminal: RJ-45 port and the wire within it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct LogicalPort {
    pub port: u8,
    pub channel: u8,
}

impl LogicalPort {
    pub const fn new(port: u8, channel: u8) -> Self {
        Self { port, channel }
    }
}

impl fmt::Display for LogicalPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.channel)
    }
}

// ---------------------------------------------------------------------------
// Input map
// ---------------------------------------------------------------------------

/// Bit → logical port translation for one input device family.
#[derive(Debug, Clone)]
pub struct InputAddressMap {
    bits: Vec<LogicalPort, MAX_PINS_PER_DEVICE>,
    ports_per_device: u8,
    device_count: usize,
}

impl InputAddressMap {
    pub fn from_profile(profile: &InputProfile) -> Result<Self, ConfigError> {
        if profile.pins_per_device > MAX_PINS_PER_DEVICE
            || profile.device_count > MAX_INPUT_DEVICES
        {
            return Err(ConfigError::TooManyDevices);
        }
        if profile.channel_map.len() != profile.pins_per_device {
            return Err(ConfigError::ChannelMapLength {
                expected: profile.pins_per_device,
                actual: profile.channel_map.len(),
            });
        }

        let mut bits: Vec<LogicalPort, MAX_PINS_PER_DEVICE> = Vec::new();
        for entry in &profile.channel_map {
            let lp = LogicalPort::new(entry.port, entry.channel);
            if bits.contains(&lp) {
                return Err(ConfigError::ChannelMapCollision {
                    port: lp.port,
                    channel: lp.channel,
                });
            }
            bits.push(lp).map_err(|_| ConfigError::TooManyDevices)?;
        }

        // Ports of neighbouring devices must not overlap once offset.
        let ports_per_device = profile.ports_per_device();
        if profile.device_count > 1 {
            let lowest = bits.iter().map(|lp| lp.port).min().unwrap_or(0);
            if let Some(lp) = bits
                .iter()
                .find(|lp| usize::from(lp.port - lowest) >= ports_per_device)
            {
                return Err(ConfigError::ChannelMapCollision {
                    port: lp.port,
                    channel: lp.channel,
                });
            }
        }

        // The last device's highest port must still fit the port number.
        let highest = bits.iter().map(|lp| usize::from(lp.port)).max().unwrap_or(0);
        let last = highest + ports_per_device * profile.device_count.saturating_sub(1);
        if last > usize::from(u8::MAX) {
            return Err(ConfigError::PortNumberOverflow { port: last });
        }

        Ok(Self {
            bits,
            ports_per_device: ports_per_device as u8,
            device_count: profile.device_count,
        })
    }

    /// Logical port of `bit` on `device`.
    pub fn resolve(&self, device: usize, bit: usize) -> Option<LogicalPort> {
        if device >= self.device_count {
            return None;
        }
        let base = self.bits.get(bit)?;
        let offset = u8::try_from(device)
            .ok()
            .and_then(|d| self.ports_per_device.checked_mul(d))?;
        Some(LogicalPort::new(base.port.checked_add(offset)?, base.channel))
    }

    /// Inverse of [`resolve`](Self::resolve): `(device, bit)` owning `port`.
    pub fn locate(&self, port: LogicalPort) -> Option<(usize, usize)> {
        (0..self.device_count).find_map(|device| {
            (0..self.bits.len())
                .find(|&bit| self.resolve(device, bit) == Some(port))
                .map(|bit| (device, bit))
        })
    }

    pub fn pins_per_device(&self) -> usize {
        self.bits.len()
    }
}

// ---------------------------------------------------------------------------
// Output map
// ---------------------------------------------------------------------------

/// Port ↔ (device, pin) translation for one output device family.
#[derive(Debug, Clone)]
pub struct OutputAddressMap {
    ports: Vec<u8, MAX_OUTPUT_CHANNELS>,
    pins_per_device: usize,
}

impl OutputAddressMap {
    pub fn from_profile(profile: &OutputProfile) -> Result<Self, ConfigError> {
        if profile.pins_per_device > MAX_PINS_PER_DEVICE
            || profile.device_count > MAX_OUTPUT_DEVICES
        {
            return Err(ConfigError::TooManyDevices);
        }

        let mut ports: Vec<u8, MAX_OUTPUT_CHANNELS> = Vec::new();
        for device in 0..profile.device_count {
            for pin in 0..profile.pins_per_device {
                let port = profile
                    .port_map
                    .get(device * profile.pins_per_device + pin)
                    .copied()
                    .unwrap_or(0);
                if port == 0 {
                    return Err(ConfigError::UnmappedOutputPin { device, pin });
                }
                if ports.contains(&port) {
                    return Err(ConfigError::DuplicateOutputPort(port));
                }
                ports.push(port).map_err(|_| ConfigError::TooManyDevices)?;
            }
        }

        Ok(Self {
            ports,
            pins_per_device: profile.pins_per_device,
        })
    }

    pub fn port(&self, device: usize, pin: usize) -> Option<u8> {
        if pin >= self.pins_per_device {
            return None;
        }
        self.ports.get(device * self.pins_per_device + pin).copied()
    }

    pub fn locate(&self, port: u8) -> Option<(usize, usize)> {
        let idx = self.ports.iter().position(|&p| p == port)?;
        Some((idx / self.pins_per_device, idx % self.pins_per_device))
    }
}
