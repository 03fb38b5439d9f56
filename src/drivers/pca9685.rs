//! NXP PCA9685 16-channel, 12-bit PWM controller.
//!
//! Each output has four registers (ON_L, ON_H, OFF_L, OFF_H) starting at
//! `LED0_ON_L + 4 * pin`.  Bit 4 of ON_H / OFF_H forces the output fully
//! on / fully off, which is used for the two ends of the range so binary
//! loads never see a glitch from the counter.

use embedded_hal::i2c::I2c;

use super::PwmController;
use crate::error::FaultReason;

const REG_MODE1: u8 = 0x00;
const REG_LED0_ON_L: u8 = 0x06;
const REG_ALL_LED_ON_L: u8 = 0xFA;
const REG_PRESCALE: u8 = 0xFE;

const MODE1_RESTART: u8 = 0x80;
const MODE1_AUTO_INCREMENT: u8 = 0x20;
const MODE1_SLEEP: u8 = 0x10;
const MODE1_ALLCALL: u8 = 0x01;
const MODE1_RUN: u8 = MODE1_AUTO_INCREMENT | MODE1_ALLCALL;

const FULL_BIT: u8 = 0x10;
const PIN_COUNT: usize = 16;
const COUNTER_MAX: u32 = 4095;
const OSCILLATOR_HZ: u32 = 25_000_000;
const PRESCALE_MIN: u64 = 3;
const PRESCALE_MAX: u64 = 255;

#[derive(Debug, Clone, Copy, Default)]
pub struct Pca9685;

impl Pca9685 {
    /// Prescaler for the requested output frequency.
    pub fn prescale(frequency_hz: u32) -> u8 {
        let divisor = 4096 * u64::from(frequency_hz.max(1));
        let value = (u64::from(OSCILLATOR_HZ) + divisor / 2) / divisor;
        value.saturating_sub(1).clamp(PRESCALE_MIN, PRESCALE_MAX) as u8
    }

    /// Register image (ON_L, ON_H, OFF_L, OFF_H) for a duty value.
    fn led_registers(ticks: u16, full_scale: u16) -> [u8; 4] {
        if ticks == 0 {
            return [0, 0, 0, FULL_BIT];
        }
        if ticks >= full_scale {
            return [0, FULL_BIT, 0, 0];
        }
        let off = u32::from(ticks) * COUNTER_MAX / u32::from(full_scale);
        [0, 0, (off & 0xFF) as u8, ((off >> 8) & 0x0F) as u8]
    }

    fn write_mode1<B: I2c>(bus: &mut B, address: u8, mode: u8) -> Result<(), FaultReason> {
        bus.write(address, &[REG_MODE1, mode])
            .map_err(|e| FaultReason::from_bus_error(&e))
    }
}

impl PwmController for Pca9685 {
    fn configure<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason> {
        Self::write_mode1(bus, address, MODE1_RUN)?;

        let mut mode = [0u8; 1];
        bus.write_read(address, &[REG_MODE1], &mut mode)
            .map_err(|e| FaultReason::from_bus_error(&e))?;
        if mode[0] & !MODE1_RESTART != MODE1_RUN {
            return Err(FaultReason::InvalidModeRegister);
        }
        Ok(())
    }

    fn all_off<B: I2c>(&self, bus: &mut B, address: u8) -> Result<(), FaultReason> {
        bus.write(address, &[REG_ALL_LED_ON_L, 0, 0, 0, FULL_BIT])
            .map_err(|e| FaultReason::from_bus_error(&e))
    }

    fn set_frequency<B: I2c>(
        &self,
        bus: &mut B,
        address: u8,
        frequency_hz: u32,
    ) -> Result<(), FaultReason> {
        // The prescaler only latches while the oscillator is asleep.
        Self::write_mode1(bus, address, MODE1_RUN | MODE1_SLEEP)?;
        bus.write(address, &[REG_PRESCALE, Self::prescale(frequency_hz)])
            .map_err(|e| FaultReason::from_bus_error(&e))?;
        Self::write_mode1(bus, address, MODE1_RUN)?;
        Self::write_mode1(bus, address, MODE1_RUN | MODE1_RESTART)
    }

    fn write_ticks<B: I2c>(
        &self,
        bus: &mut B,
        address: u8,
        pin: usize,
        ticks: u16,
        full_scale: u16,
    ) -> Result<(), FaultReason> {
        if pin >= PIN_COUNT {
            return Err(FaultReason::ChannelOutOfRange);
        }
        let [on_l, on_h, off_l, off_h] = Self::led_registers(ticks, full_scale);
        let reg = REG_LED0_ON_L + 4 * pin as u8;
        bus.write(address, &[reg, on_l, on_h, off_l, off_h])
            .map_err(|e| FaultReason::from_bus_error(&e))
    }
}
