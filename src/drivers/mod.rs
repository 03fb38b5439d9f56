//! Device-family drivers.
//!
//! Each bus-attached device family is a small strategy behind a trait, so
//! the port managers never know which chip they are talking to.  The
//! family is picked from the hardware profile at construction time.
//!
//! | Family    | Trait              | Role                        |
//! |-----------|--------------------|-----------------------------|
//! | `pca9555` | [`InputExpander`]  | 16-bit input expander       |
//! | `pca9685` | [`PwmController`]  | 16-channel 12-bit PWM       |
//!
//! The bus itself is any `embedded_hal::i2c::I2c` implementation.

use embedded_hal::i2c::I2c;
use serde::{Deserialize, Serialize};

use crate::error::FaultReason;

pub mod pca9555;
pub mod pca9685;

/// Bus-attached input expander.
pub trait InputExpander {
    /// Put every pin into input mode with non-inverted polarity.
    fn configure<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason>;

    /// Read all pins in a single transaction; bit `n` is pin `n`.
    fn read_inputs<B: I2c>(&self, bus: &mut B, address: u8) -> Result<u16, FaultReason>;
}

/// Bus-attached PWM output controller.
pub trait PwmController {
    /// Reset the controller and verify its mode register.
    fn configure<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason>;

    /// Drive every output to zero.
    fn all_off<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason>;

    fn set_frequency<B: I2c>(
        &self,
        bus: &mut B,
        address: u8,
        frequency_hz: u32,
    ) -> Result<(), FaultReason>;

    /// Write `ticks` out of `full_scale` to `pin`.
    fn write_ticks<B: I2c>(
        &self,
        bus: &mut B,
        address: u8,
        pin: usize,
        ticks: u16,
        full_scale: u16,
    ) -> Result<(), FaultReason>;
}

/// GPIO lines carrying the expanders' change-interrupt outputs.
///
/// Lines are sampled, not edge-latched.
pub trait InterruptLines {
    fn configure_input(&mut self, pin: u8) -> Result<(), FaultReason>;

    /// `true` while the expander on `pin` signals a pending change.
    fn is_asserted(&mut self, pin: u8) -> bool;
}

impl<T: InterruptLines + ?Sized> InterruptLines for &mut T {
    fn configure_input(&mut self, pin: u8) -> Result<(), FaultReason> {
        (**self).configure_input(pin)
    }

    fn is_asserted(&mut self, pin: u8) -> bool {
        (**self).is_asserted(pin)
    }
}

// ---------------------------------------------------------------------------
// Family selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputFamily {
    /// NXP PCA9555 16-bit I2C I/O port with interrupt.
    #[default]
    Pca9555,
}

impl InputExpander for InputFamily {
    fn configure<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason> {
        match self {
            Self::Pca9555 => pca9555::Pca9555.configure(bus, address),
        }
    }

    fn read_inputs<B: I2c>(&self, bus: &mut B, address: u8) -> Result<u16, FaultReason> {
        match self {
            Self::Pca9555 => pca9555::Pca9555.read_inputs(bus, address),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFamily {
    /// NXP PCA9685 16-channel 12-bit PWM LED controller.
    #[default]
    Pca9685,
}

impl PwmController for OutputFamily {
    fn configure<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason> {
        match self {
            Self::Pca9685 => pca9685::Pca9685.configure(bus, address),
        }
    }

    fn all_off<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason> {
        match self {
            Self::Pca9685 => pca9685::Pca9685.all_off(bus, address),
        }
    }

    fn set_frequency<B: I2c>(
        &self,
        bus: &mut B,
        address: u8,
        frequency_hz: u32,
    ) -> Result<(), FaultReason> {
        match self {
            Self::Pca9685 => pca9685::Pca9685.set_frequency(bus, address, frequency_hz),
        }
    }

    fn write_ticks<B: I2c>(
        &self,
        bus: &mut B,
        address: u8,
        pin: usize,
        ticks: u16,
        full_scale: u16,
    ) -> Result<(), FaultReason> {
        match self {
            Self::Pca9685 => pca9685::Pca9685.write_ticks(bus, address, pin, ticks, full_scale),
        }
    }
}
