//! Scripted I2C bus for driver and manager unit tests.
//!
//! Reads return pinned register values (zero otherwise) and writes are only
//! recorded. The integration suite's `mock_hw` models chip behaviour.

use std::collections::HashMap;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};

#[derive(Debug, Default)]
pub struct MockBus {
    pinned: HashMap<(u8, u8), u8>,
    pointers: HashMap<u8, u8>,
    failing: HashMap<u8, ErrorKind>,
    writes: Vec<(u8, Vec<u8>)>,
    transactions: usize,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present `value` on an expander's input port pair.
    pub fn set_inputs(&mut self, address: u8, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.pin_register(address, 0x00, lo);
        self.pin_register(address, 0x01, hi);
    }

    /// Make a register read back `value` regardless of writes.
    pub fn pin_register(&mut self, address: u8, reg: u8, value: u8) {
        self.pinned.insert((address, reg), value);
    }

    pub fn fail(&mut self, address: u8, kind: ErrorKind) {
        self.failing.insert(address, kind);
    }

    pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, w)| w.clone())
            .collect()
    }

    pub fn transactions(&self) -> usize {
        self.transactions
    }

    pub fn clear(&mut self) {
        self.writes.clear();
        self.transactions = 0;
    }
}

impl ErrorType for MockBus {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for MockBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;
        if let Some(kind) = self.failing.get(&address) {
            return Err(*kind);
        }

        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.writes.push((address, bytes.to_vec()));
                    if let Some(&reg) = bytes.first() {
                        self.pointers.insert(address, reg);
                    }
                }
                Operation::Read(buf) => {
                    let reg = self.pointers.get(&address).copied().unwrap_or(0);
                    for (i, b) in buf.iter_mut().enumerate() {
                        let r = reg.wrapping_add(i as u8);
                        *b = self.pinned.get(&(address, r)).copied().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}
