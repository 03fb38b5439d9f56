//! Built-in hardware profiles for the supported panel products.
//!
//! Single source of truth for the bus addresses, interrupt GPIOs and
//! pin → port tables of every board revision.  Select one at runtime with
//! [`for_product`] instead of rebuilding the firmware per product.

use heapless::Vec;

use crate::config::{
    DEFAULT_CHANNELS_PER_PORT, DEFAULT_PINS_PER_EXPANDER, DEFAULT_PWM_FREQUENCY_HZ,
    DEFAULT_PWM_FULL_SCALE, DebounceConfig, HardwareProfile, InputChannelConfig, InputProfile,
    OutputProfile,
};
use crate::drivers::{InputFamily, OutputFamily};

/// Product identifiers with a built-in profile.
pub const SUPPORTED_PRODUCTS: [u32; 5] = [
    0x3232_2211,
    0x3232_2304,
    0x3232_2505,
    0x0806_2305,
    0x0806_2505,
];

// ---------------------------------------------------------------------------
// Expander bit → (port, channel) tables
// ---------------------------------------------------------------------------

/// Six-wire jack wiring used by the first 32-port boards.
#[rustfmt::skip]
const CHANNELS_SIX_WIRE: [(u8, u8); 16] = [
    (1, 1), (1, 2), (1, 3), (2, 6), (1, 6), (2, 3), (2, 2), (2, 1),
    (3, 1), (3, 2), (3, 3), (4, 6), (3, 6), (4, 3), (4, 2), (4, 1),
];

/// Four-wire jack wiring used from the 2305 revision onward.
#[rustfmt::skip]
const CHANNELS_FOUR_WIRE: [(u8, u8); 16] = [
    (2, 1), (2, 2), (2, 3), (1, 4), (2, 4), (1, 3), (1, 2), (1, 1),
    (4, 1), (4, 2), (4, 3), (3, 4), (4, 4), (3, 3), (3, 2), (3, 1),
];

const EXPANDER_ADDRESSES_8: [u8; 8] = [0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27];
const EXPANDER_ADDRESSES_2: [u8; 2] = [0x20, 0x21];

// ---------------------------------------------------------------------------
// PWM controller pin → port tables (per controller)
// ---------------------------------------------------------------------------

const OUTPUT_PORTS_16: [u8; 16] = [2, 1, 3, 4, 6, 5, 7, 8, 10, 9, 11, 12, 14, 13, 15, 16];
const OUTPUT_PORTS_6: [u8; 6] = [1, 2, 4, 3, 5, 6];

/// Look up the built-in profile for a product identifier.
pub fn for_product(product_id: u32) -> Option<HardwareProfile> {
    let (inputs, outputs) = match product_id {
        0x3232_2211 => (
            inputs(&CHANNELS_SIX_WIRE, &[35, 25, 26, 27, 4, 5, 18, 19], &EXPANDER_ADDRESSES_8),
            outputs(&OUTPUT_PORTS_16, &[0x40, 0x42]),
        ),
        0x3232_2304 => (
            inputs(&CHANNELS_SIX_WIRE, &[35, 25, 26, 27, 4, 5, 18, 19], &EXPANDER_ADDRESSES_8),
            outputs(&OUTPUT_PORTS_16, &[0x40, 0x41]),
        ),
        0x3232_2505 => (
            inputs(&CHANNELS_FOUR_WIRE, &[34, 35, 33, 27, 15, 4, 5, 18], &EXPANDER_ADDRESSES_8),
            outputs(&OUTPUT_PORTS_16, &[0x40, 0x41]),
        ),
        0x0806_2305 | 0x0806_2505 => (
            inputs(&CHANNELS_FOUR_WIRE, &[34, 35], &EXPANDER_ADDRESSES_2),
            outputs(&OUTPUT_PORTS_6, &[0x40]),
        ),
        _ => return None,
    };

    Some(HardwareProfile {
        product_id,
        inputs,
        outputs,
        debounce: DebounceConfig::default(),
    })
}

fn inputs(map: &[(u8, u8)], interrupt_pins: &[u8], addresses: &[u8]) -> InputProfile {
    InputProfile {
        family: InputFamily::Pca9555,
        device_count: addresses.len(),
        pins_per_device: DEFAULT_PINS_PER_EXPANDER,
        channels_per_port: DEFAULT_CHANNELS_PER_PORT,
        interrupt_pins: Vec::from_slice(interrupt_pins).unwrap_or_default(),
        addresses: Vec::from_slice(addresses).unwrap_or_default(),
        channel_map: map
            .iter()
            .map(|&(port, channel)| InputChannelConfig::new(port, channel))
            .collect(),
        overrides: Vec::new(),
    }
}

/// Each further controller carries the same pin pattern shifted past the
/// ports of the controllers before it.
fn outputs(pattern: &[u8], addresses: &[u8]) -> OutputProfile {
    let stride = pattern.len() as u8;
    let port_map = addresses
        .iter()
        .enumerate()
        .flat_map(|(device, _)| pattern.iter().map(move |&p| p + stride * device as u8))
        .collect();

    OutputProfile {
        family: OutputFamily::Pca9685,
        device_count: addresses.len(),
        pins_per_device: pattern.len(),
        addresses: Vec::from_slice(addresses).unwrap_or_default(),
        port_map,
        full_scale: DEFAULT_PWM_FULL_SCALE,
        frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
        variable_ports: Vec::new(),
    }
}
