//! Fuzz target: output port command sequences
//!
//! Drives arbitrary `set_port_value` / `enable_port` sequences against the
//! largest built-in profile, with an optional bus failure injected, and
//! verifies:
//! - `get_port_value` is always 0..=100
//! - a write to a faulted controller never reports success
//! - a disabled port always reads back 0 once its zero write succeeded
//!
//! cargo fuzz run fuzz_port_writes

#![no_main]

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use libfuzzer_sys::fuzz_target;
use panelio::app::events::EventRecorder;
use panelio::outputs::{OutputPortManager, SetPortResult};
use panelio::profiles;

/// Acknowledges everything except the controller named in `failing`.
struct ScriptedBus {
    failing: Option<u8>,
}

impl ErrorType for ScriptedBus {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for ScriptedBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.failing == Some(address) {
            return Err(ErrorKind::Bus);
        }
        for op in operations {
            if let Operation::Read(buf) = op {
                buf.fill(0x21);
            }
        }
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let Some(profile) = profiles::for_product(0x3232_2505) else {
        return;
    };
    let mut bus = ScriptedBus { failing: None };
    let mut mgr = OutputPortManager::new(profile.outputs, EventRecorder::new());
    if mgr.begin(&mut bus).is_err() {
        return;
    }

    for chunk in data.chunks_exact(3) {
        let (op, port, value) = (chunk[0], chunk[1] % 40, chunk[2]);
        let result = match op % 4 {
            0 | 1 => mgr.set_port_value(&mut bus, port, value),
            2 => mgr.enable_port(&mut bus, port, value & 1 == 1),
            _ => {
                bus.failing = Some(if value & 1 == 0 { 0x40 } else { 0x41 });
                continue;
            }
        };

        let offline = mgr
            .health()
            .get(if port <= 16 { 0x40 } else { 0x41 })
            .is_some_and(|d| !d.enabled);
        if offline && mgr.port_type(port).is_some() {
            assert!(!matches!(result, SetPortResult::Success) || op % 4 == 2 && value & 1 == 1);
        }
        if op % 4 == 2 && value & 1 == 0 && result == SetPortResult::Success {
            assert_eq!(mgr.get_port_value(port), 0);
        }
        assert!(mgr.get_port_value(port) <= 100);
    }
});
