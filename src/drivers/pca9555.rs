//! NXP PCA9555 16-bit I2C input expander.
//!
//! Registers come in port-0 / port-1 pairs and the register pointer
//! toggles within a pair, so every 16-bit access is one transaction.
//! The INT output is open-drain, active low, and is released when the
//! input port is read.

use embedded_hal::i2c::I2c;

use super::InputExpander;
use crate::error::FaultReason;

const REG_INPUT_0: u8 = 0x00;
const REG_POLARITY_0: u8 = 0x04;
const REG_CONFIG_0: u8 = 0x06;

/// All pins input (1 = input).
const CONFIG_ALL_INPUTS: u8 = 0xFF;
/// No inversion; the manager applies polarity itself.
const POLARITY_ORIGINAL: u8 = 0x00;

#[derive(Debug, Clone, Copy, Default)]
pub struct Pca9555;

impl InputExpander for Pca9555 {
    fn configure<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason> {
        bus.write(address, &[REG_POLARITY_0, POLARITY_ORIGINAL, POLARITY_ORIGINAL])
            .map_err(|e| FaultReason::from_bus_error(&e))?;
        bus.write(address, &[REG_CONFIG_0, CONFIG_ALL_INPUTS, CONFIG_ALL_INPUTS])
            .map_err(|e| FaultReason::from_bus_error(&e))
    }

    fn read_inputs<B: I2c>(&self, bus: &mut B, address: u8) -> Result<u16, FaultReason> {
        let mut buf = [0u8; 2];
        bus.write_read(address, &[REG_INPUT_0], &mut buf)
            .map_err(|e| FaultReason::from_bus_error(&e))?;
        Ok(u16::from_le_bytes(buf))
    }
}
