//! Hardware profile: the static configuration consumed by the port managers.
//!
//! A profile describes one product variant: how many expanders and PWM
//! controllers are fitted, where they sit on the bus, and how their raw
//! pins map onto the RJ-45 ports on the front of the panel. Profiles are
//! handed over by the hardware-profile loader (JSON or postcard) or taken
//! from [`crate::profiles`], and are validated once by each manager's
//! `begin()`.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::drivers::{InputFamily, OutputFamily};

/// Most input expanders a panel can carry.
pub const MAX_INPUT_DEVICES: usize = 8;
/// Most PWM output controllers a panel can carry.
pub const MAX_OUTPUT_DEVICES: usize = 8;
/// Most pins on a single device (PCA9555 / PCA9685 both have 16).
pub const MAX_PINS_PER_DEVICE: usize = 16;
/// Upper bound on output channels across all controllers.
pub const MAX_OUTPUT_CHANNELS: usize = MAX_OUTPUT_DEVICES * MAX_PINS_PER_DEVICE;
/// Maximum number of characters in a port's ID.
pub const PORT_ID_MAX_LENGTH: usize = 8;

/// Pins on each IO extender.
pub const DEFAULT_PINS_PER_EXPANDER: usize = 16;
/// Usable channels (wires) per RJ-45 port.
pub const DEFAULT_CHANNELS_PER_PORT: usize = 4;
/// PCA9685 12-bit duty register maximum.
pub const DEFAULT_PWM_FULL_SCALE: u16 = 4095;
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 1500;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Resting wiring of an input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    /// At rest the contact is open (typically a button).
    #[default]
    NormallyOpen,
    /// At rest the contact is closed (typically a reed switch).
    NormallyClosed,
}

/// Logical assignment and behaviour of one expander bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputChannelConfig {
    pub port: u8,
    pub channel: u8,
    #[serde(default)]
    pub polarity: Polarity,
    /// Buttons want long presses, reed switches don't.
    #[serde(default)]
    pub monitor_long_press: bool,
}

impl InputChannelConfig {
    pub const fn new(port: u8, channel: u8) -> Self {
        Self {
            port,
            channel,
            polarity: Polarity::NormallyOpen,
            monitor_long_press: false,
        }
    }
}

/// Per-device patch on top of the shared channel map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOverride {
    pub device: u8,
    pub bit: u8,
    pub polarity: Polarity,
    pub monitor_long_press: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputProfile {
    pub family: InputFamily,
    pub device_count: usize,
    pub pins_per_device: usize,
    pub channels_per_port: usize,
    /// Interrupt GPIO per device; order matches `addresses`.
    pub interrupt_pins: Vec<u8, MAX_INPUT_DEVICES>,
    pub addresses: Vec<u8, MAX_INPUT_DEVICES>,
    /// Indexed by bit; applies to every device with a per-device port offset.
    pub channel_map: Vec<InputChannelConfig, MAX_PINS_PER_DEVICE>,
    #[serde(default)]
    pub overrides: Vec<ChannelOverride, 32>,
}

impl InputProfile {
    /// Ports covered by one device; used as the per-device port offset.
    pub fn ports_per_device(&self) -> usize {
        if self.channels_per_port == 0 {
            0
        } else {
            self.pins_per_device / self.channels_per_port
        }
    }

    /// Effective configuration of `bit` on `device`, overrides applied.
    pub fn channel_config(&self, device: usize, bit: usize) -> Option<InputChannelConfig> {
        let mut cfg = *self.channel_map.get(bit)?;
        if let Some(o) = self
            .overrides
            .iter()
            .find(|o| o.device as usize == device && o.bit as usize == bit)
        {
            cfg.polarity = o.polarity;
            cfg.monitor_long_press = o.monitor_long_press;
        }
        Some(cfg)
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputProfile {
    pub family: OutputFamily,
    pub device_count: usize,
    pub pins_per_device: usize,
    pub addresses: Vec<u8, MAX_OUTPUT_DEVICES>,
    /// Port number per (device, pin), device-major.  Zero means unmapped.
    pub port_map: Vec<u8, MAX_OUTPUT_CHANNELS>,
    pub full_scale: u16,
    pub frequency_hz: u32,
    /// Ports driven with a variable duty cycle; all others are binary.
    #[serde(default)]
    pub variable_ports: Vec<u8, MAX_OUTPUT_CHANNELS>,
}

// ---------------------------------------------------------------------------
// Debounce
// ---------------------------------------------------------------------------

/// Classification thresholds.  Short window is `[short_ms, long_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Minimum time a change must persist before a short event fires.
    pub short_ms: u64,
    /// Time after which a monitored channel raises a long event.
    pub long_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            short_ms: 100,
            long_ms: 1000,
        }
    }
}

impl DebounceConfig {
    pub fn is_valid(&self) -> bool {
        self.short_ms < self.long_ms
    }
}

// ---------------------------------------------------------------------------
// Whole profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub product_id: u32,
    pub inputs: InputProfile,
    pub outputs: OutputProfile,
    #[serde(default)]
    pub debounce: DebounceConfig,
}

impl HardwareProfile {
    /// Parse a profile handed over by the hardware-profile loader.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a profile from the loader's compact binary form.
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    pub fn to_postcard(&self) -> Result<std::vec::Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }
}
