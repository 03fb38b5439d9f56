//! Per-channel output state and percent ↔ tick conversion.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::config::PORT_ID_MAX_LENGTH;

/// Below this a request snaps to 0 %.
pub const DEADBAND_LOW: u8 = 5;
/// Above this a request snaps to 100 %.
pub const DEADBAND_HIGH: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputType {
    /// Fully on or fully off.
    #[default]
    Binary,
    /// Duty cycle follows the requested percentage.
    Variable,
}

/// Outcome of an output write.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetPortResult {
    Success,
    Failed,
    InvalidPort,
    /// Hardware already holds the requested value; nothing was written.
    Excessive,
    ControllerNotEnabled,
    PortNotEnabled,
}

impl SetPortResult {
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Success | Self::Excessive)
    }
}

/// Clamp to 0..=100 and apply the deadband.
pub const fn effective_percent(percent: u8) -> u8 {
    let p = if percent > 100 { 100 } else { percent };
    if p < DEADBAND_LOW {
        0
    } else if p > DEADBAND_HIGH {
        100
    } else {
        p
    }
}

pub fn percent_to_ticks(percent: u8, output_type: OutputType, full_scale: u16) -> u16 {
    let p = effective_percent(percent);
    match output_type {
        OutputType::Binary => {
            if p == 0 {
                0
            } else {
                full_scale
            }
        }
        OutputType::Variable => {
            ((u32::from(p) * u32::from(full_scale) + 50) / 100) as u16
        }
    }
}

pub fn ticks_to_percent(ticks: u16, full_scale: u16) -> u8 {
    if full_scale == 0 {
        return 0;
    }
    let fs = u32::from(full_scale);
    let t = u32::from(ticks).min(fs);
    ((t * 100 + fs / 2) / fs) as u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChannelState {
    port: u8,
    pin: usize,
    pub(crate) enabled: bool,
    output_type: OutputType,
    /// Last value written to hardware.
    pub(crate) last_ticks: u16,
    pub(crate) label: String<PORT_ID_MAX_LENGTH>,
}

impl OutputChannelState {
    pub fn new(port: u8, pin: usize, output_type: OutputType) -> Self {
        Self {
            port,
            pin,
            enabled: true,
            output_type,
            last_ticks: 0,
            label: String::new(),
        }
    }

    pub fn port(&self) -> u8 {
        self.port
    }

    pub fn pin(&self) -> usize {
        self.pin
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn last_ticks(&self) -> u16 {
        self.last_ticks
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
