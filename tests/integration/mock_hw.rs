//! Mock panel hardware for integration tests.
//!
//! A scripted I2C bus that behaves like the PCA9555 expanders and PCA9685
//! controllers fitted to the panel closely enough for the port managers:
//! register pointer writes, auto-increment, readable input ports, and
//! decodable LED registers.  Any address can be told to fail.

use std::collections::HashMap;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};
use panelio::config::{
    DebounceConfig, InputChannelConfig, InputProfile, OutputProfile, Polarity,
};
use panelio::drivers::{InputFamily, OutputFamily};

const FULL_BIT: u8 = 0x10;
const REG_LED0: u8 = 0x06;
const REG_ALL_LED: u8 = 0xFA;

pub struct MockBus {
    registers: HashMap<(u8, u8), u8>,
    inputs: HashMap<u8, u16>,
    pointers: HashMap<u8, u8>,
    failing: HashMap<u8, ErrorKind>,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub transactions: usize,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self {
            registers: HashMap::new(),
            inputs: HashMap::new(),
            pointers: HashMap::new(),
            failing: HashMap::new(),
            writes: Vec::new(),
            transactions: 0,
        }
    }

    /// Present `value` on an expander's input ports (bit high = open).
    pub fn set_inputs(&mut self, address: u8, value: u16) {
        self.inputs.insert(address, value);
    }

    /// Pull one expander bit low (contact closed) or release it.
    pub fn set_bit(&mut self, address: u8, bit: u8, closed: bool) {
        let v = self.inputs.get(&address).copied().unwrap_or(0xFFFF);
        let v = if closed { v & !(1 << bit) } else { v | (1 << bit) };
        self.inputs.insert(address, v);
    }

    pub fn fail(&mut self, address: u8, kind: ErrorKind) {
        self.failing.insert(address, kind);
    }

    pub fn heal(&mut self, address: u8) {
        self.failing.remove(&address);
    }

    /// Decode the duty currently held by a PCA9685 output.
    pub fn led_ticks(&self, address: u8, pin: u8) -> Option<u16> {
        let base = REG_LED0 + 4 * pin;
        let on_h = *self.registers.get(&(address, base + 1))?;
        let off_l = *self.registers.get(&(address, base + 2))?;
        let off_h = *self.registers.get(&(address, base + 3))?;
        if on_h & FULL_BIT != 0 {
            Some(4095)
        } else if off_h & FULL_BIT != 0 {
            Some(0)
        } else {
            Some(u16::from(off_h & 0x0F) << 8 | u16::from(off_l))
        }
    }

    pub fn writes_to(&self, address: u8) -> usize {
        self.writes.iter().filter(|(a, _)| *a == address).count()
    }

    pub fn clear(&mut self) {
        self.writes.clear();
        self.transactions = 0;
    }

    fn read_register(&self, address: u8, reg: u8) -> u8 {
        match (self.inputs.get(&address), reg) {
            (Some(v), 0x00) => v.to_le_bytes()[0],
            (Some(v), 0x01) => v.to_le_bytes()[1],
            _ => self.registers.get(&(address, reg)).copied().unwrap_or(0),
        }
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
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
                    if let Some((&reg, data)) = bytes.split_first() {
                        for (i, b) in data.iter().enumerate() {
                            let r = reg.wrapping_add(i as u8);
                            // MODE1 restart bit self-clears.
                            let b = if r == 0x00 && !self.inputs.contains_key(&address) {
                                b & !0x80
                            } else {
                                *b
                            };
                            self.registers.insert((address, r), b);
                        }
                        self.pointers.insert(address, reg);
                        // ALL_LED_* mirrors into every LEDn register.
                        if reg == REG_ALL_LED && data.len() == 4 {
                            for pin in 0..16u8 {
                                for (i, b) in data.iter().enumerate() {
                                    self.registers.insert((address, REG_LED0 + 4 * pin + i as u8), *b);
                                }
                            }
                        }
                    }
                }
                Operation::Read(buf) => {
                    let reg = self.pointers.get(&address).copied().unwrap_or(0);
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = self.read_register(address, reg.wrapping_add(i as u8));
                    }
                }
            }
        }
        Ok(())
    }
}

// ── Profiles ──────────────────────────────────────────────────

pub const DEBOUNCE: DebounceConfig = DebounceConfig {
    short_ms: 50,
    long_ms: 1500,
};

/// Two 16-bit expanders at 0x20/0x21 on GPIO 34/35.  Device 0 bit 3 is
/// port 12 channel 1; every bit is a normally-open button with long-press
/// monitoring except bit 15, a normally-closed reed switch.
pub fn input_profile() -> InputProfile {
    let channel_map = (0..16u8)
        .map(|bit| InputChannelConfig {
            port: 12 + bit / 4,
            channel: if bit % 4 == 3 { 1 } else { bit % 4 + 2 },
            polarity: if bit == 15 {
                Polarity::NormallyClosed
            } else {
                Polarity::NormallyOpen
            },
            monitor_long_press: bit != 15,
        })
        .collect();

    InputProfile {
        family: InputFamily::Pca9555,
        device_count: 2,
        pins_per_device: 16,
        channels_per_port: 4,
        interrupt_pins: heapless::Vec::from_slice(&[34, 35]).unwrap(),
        addresses: heapless::Vec::from_slice(&[0x20, 0x21]).unwrap(),
        channel_map,
        overrides: heapless::Vec::new(),
    }
}

/// Two PCA9685s at 0x40/0x41, ports 1..=16 then 17..=32 in pin order.
/// Ports 9 and 25 are variable, the rest binary.
pub fn output_profile() -> OutputProfile {
    OutputProfile {
        family: OutputFamily::Pca9685,
        device_count: 2,
        pins_per_device: 16,
        addresses: heapless::Vec::from_slice(&[0x40, 0x41]).unwrap(),
        port_map: (1..=32).collect(),
        full_scale: 4095,
        frequency_hz: 1500,
        variable_ports: heapless::Vec::from_slice(&[9, 25]).unwrap(),
    }
}

/// Bus with both expanders idle (all contacts open, reed switches closed).
pub fn idle_bus() -> MockBus {
    let mut bus = MockBus::new();
    bus.set_inputs(0x20, 0x7FFF);
    bus.set_inputs(0x21, 0x7FFF);
    bus
}
