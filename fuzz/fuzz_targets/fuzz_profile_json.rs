//! Fuzz target: hardware profile parsing and validation
//!
//! Feeds arbitrary bytes to `HardwareProfile::from_json` (falling back to
//! `HardwareProfile::from_postcard` for input that isn't JSON) and, for every
//! profile that parses, runs both managers' `begin()` against an
//! always-acknowledging bus, verifying:
//! - No panics on malformed or inconsistent profiles
//! - A rejected profile leaves its subsystem with an empty health report
//! - An accepted profile reports exactly `device_count` devices
//!
//! cargo fuzz run fuzz_profile_json

#![no_main]

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use libfuzzer_sys::fuzz_target;
use panelio::adapters::hardware::GpioInterruptLines;
use panelio::adapters::log_sink::LogSink;
use panelio::config::HardwareProfile;
use panelio::inputs::InputPortManager;
use panelio::outputs::OutputPortManager;

/// Acknowledges everything; reads return 0x21 (a healthy PCA9685 MODE1,
/// and "all open but bits 1 and 6" on an expander).
struct AckBus;

impl ErrorType for AckBus {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for AckBus {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            if let Operation::Read(buf) = op {
                buf.fill(0x21);
            }
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let parsed = core::str::from_utf8(data)
        .ok()
        .and_then(|text| HardwareProfile::from_json(text).ok())
        .or_else(|| HardwareProfile::from_postcard(data).ok());
    let Some(profile) = parsed else {
        return;
    };

    let mut bus = AckBus;

    let device_count = profile.inputs.device_count;
    let mut inputs = InputPortManager::new(
        profile.inputs,
        profile.debounce,
        GpioInterruptLines::new(),
        LogSink::new(),
    );
    match inputs.begin(&mut bus) {
        Ok(()) => assert_eq!(inputs.health().count(), device_count),
        Err(_) => assert_eq!(inputs.health().count(), 0),
    }
    for t in [0, 100, 2000] {
        inputs.poll(&mut bus, t);
    }

    let device_count = profile.outputs.device_count;
    let mut outputs = OutputPortManager::new(profile.outputs, LogSink::new());
    match outputs.begin(&mut bus) {
        Ok(()) => assert_eq!(outputs.health().count(), device_count),
        Err(_) => assert_eq!(outputs.health().count(), 0),
    }
    let ports: Vec<u8> = outputs.ports().collect();
    for port in ports {
        let _ = outputs.set_port_value(&mut bus, port, 50);
    }
});
