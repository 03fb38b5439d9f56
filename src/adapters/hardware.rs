//! Hardware adapter for the expanders' interrupt lines on ESP32 GPIOs.
//!
//! The PCA9555 `INT` output is open-drain and active-low, so a line is
//! asserted while it reads low.  On non-espidf targets the adapter keeps
//! an in-memory level table that tests drive with
//! [`GpioInterruptLines::set_asserted`].

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::drivers::InterruptLines;
use crate::error::FaultReason;

/// Highest GPIO number on the ESP32.
const MAX_GPIO: u8 = 39;

/// Sampled interrupt lines of the input expanders.
#[derive(Debug, Default)]
pub struct GpioInterruptLines {
    #[cfg(not(target_os = "espidf"))]
    configured: u64,
    #[cfg(not(target_os = "espidf"))]
    asserted: u64,
}

impl GpioInterruptLines {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(target_os = "espidf")]
impl InterruptLines for GpioInterruptLines {
    fn configure_input(&mut self, pin: u8) -> Result<(), FaultReason> {
        if pin > MAX_GPIO {
            return Err(FaultReason::InvalidHardwareConfiguration);
        }
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: configures a single pin owned by this adapter.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            log::error!("[inputs] gpio_config({pin}) failed (rc={ret})");
            return Err(FaultReason::InvalidHardwareConfiguration);
        }
        Ok(())
    }

    fn is_asserted(&mut self, pin: u8) -> bool {
        // SAFETY: read-only level access on a configured input pin.
        (unsafe { gpio_get_level(i32::from(pin)) }) == 0
    }
}

#[cfg(not(target_os = "espidf"))]
impl GpioInterruptLines {
    /// Drive a simulated line.
    pub fn set_asserted(&mut self, pin: u8, asserted: bool) {
        let bit = 1u64 << pin.min(63);
        if asserted {
            self.asserted |= bit;
        } else {
            self.asserted &= !bit;
        }
    }

    /// `true` once [`InterruptLines::configure_input`] accepted `pin`.
    pub fn is_input(&self, pin: u8) -> bool {
        pin <= MAX_GPIO && self.configured & (1u64 << pin) != 0
    }
}

#[cfg(not(target_os = "espidf"))]
impl InterruptLines for GpioInterruptLines {
    fn configure_input(&mut self, pin: u8) -> Result<(), FaultReason> {
        if pin > MAX_GPIO {
            return Err(FaultReason::InvalidHardwareConfiguration);
        }
        self.configured |= 1u64 << pin;
        Ok(())
    }

    fn is_asserted(&mut self, pin: u8) -> bool {
        pin <= MAX_GPIO && self.asserted & (1u64 << pin) != 0
    }
}
