//! Input Port Manager.
//!
//! Owns every input expander on the panel.  Each [`poll`](InputPortManager::poll)
//! walks the expanders in order:
//!
//! 1. skip devices that have been faulted,
//! 2. if the device's interrupt line is asserted, read all pins in one
//!    transaction and update the per-channel debounce state,
//! 3. classify held channels into short / long events.
//!
//! A bus error takes the offending expander offline for good; its
//! siblings keep running.  Recovery means building a new manager.

pub mod channel;

use embedded_hal::i2c::I2c;
use heapless::Vec;
use log::{debug, error, info, warn};

use crate::addressing::{InputAddressMap, LogicalPort};
use crate::app::ports::{FaultSink, HealthReport, PortEventSink};
use crate::config::{DebounceConfig, InputProfile, MAX_INPUT_DEVICES, MAX_PINS_PER_DEVICE};
use crate::drivers::{InputExpander, InterruptLines};
use crate::error::{ConfigError, FaultReason};

pub use channel::{ContactState, InputChannelState, Press};

/// One expander chip and the channels wired to it.
#[derive(Debug, Clone)]
pub struct InputDevice {
    address: u8,
    interrupt_pin: u8,
    enabled: bool,
    previous_bitmask: u16,
    channels: Vec<InputChannelState, MAX_PINS_PER_DEVICE>,
}

impl InputDevice {
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn interrupt_pin(&self) -> u8 {
        self.interrupt_pin
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn previous_bitmask(&self) -> u16 {
        self.previous_bitmask
    }

    pub fn channels(&self) -> &[InputChannelState] {
        &self.channels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Running,
    Disabled(ConfigError),
}

pub struct InputPortManager<G, L> {
    profile: InputProfile,
    debounce: DebounceConfig,
    map: Option<InputAddressMap>,
    devices: Vec<InputDevice, MAX_INPUT_DEVICES>,
    lines: G,
    listener: L,
    lifecycle: Lifecycle,
}

impl<G, L> InputPortManager<G, L>
where
    G: InterruptLines,
    L: PortEventSink + FaultSink,
{
    pub fn new(profile: InputProfile, debounce: DebounceConfig, lines: G, listener: L) -> Self {
        Self {
            profile,
            debounce,
            map: None,
            devices: Vec::new(),
            lines,
            listener,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Validate the profile and bring every expander online.
    ///
    /// An inconsistent profile disables the whole subsystem and is
    /// reported once.  A device that fails to configure is faulted on its
    /// own while its siblings carry on.
    pub fn begin<B: I2c>(&mut self, bus: &mut B) -> Result<(), ConfigError> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return Err(ConfigError::AlreadyInitialized);
        }

        let map = match self.validate() {
            Ok(map) => map,
            Err(e) => {
                error!("[inputs] (begin) {e}; disabling inputs");
                self.lifecycle = Lifecycle::Disabled(e);
                self.listener
                    .on_device_fault(0, FaultReason::InvalidHardwareConfiguration);
                return Err(e);
            }
        };

        let family = self.profile.family;
        for index in 0..self.profile.device_count {
            let mut device = InputDevice {
                address: self.profile.addresses[index],
                interrupt_pin: self.profile.interrupt_pins[index],
                enabled: true,
                previous_bitmask: 0,
                channels: (0..self.profile.pins_per_device)
                    .filter_map(|bit| self.profile.channel_config(index, bit))
                    .map(|cfg| InputChannelState::new(cfg.polarity, cfg.monitor_long_press))
                    .collect(),
            };

            if let Err(reason) = self.lines.configure_input(device.interrupt_pin) {
                fault_device(&mut device, reason, &mut self.listener);
            }
            if device.enabled {
                if let Err(reason) = family.configure(bus, device.address) {
                    fault_device(&mut device, reason, &mut self.listener);
                }
            }
            if device.enabled {
                match family.read_inputs(bus, device.address) {
                    Ok(bits) => {
                        device.previous_bitmask = bits;
                        for (bit, ch) in device.channels.iter_mut().enumerate() {
                            ch.calibrate(bits & (1 << bit) != 0);
                        }
                    }
                    Err(reason) => fault_device(&mut device, reason, &mut self.listener),
                }
            }

            // Capacity was checked by validate().
            let _ = self.devices.push(device);
        }

        self.map = Some(map);
        self.lifecycle = Lifecycle::Running;
        info!(
            "[inputs] (begin) {} expanders, {} online",
            self.devices.len(),
            self.devices.iter().filter(|d| d.enabled).count()
        );
        Ok(())
    }

    fn validate(&self) -> Result<InputAddressMap, ConfigError> {
        let p = &self.profile;
        if p.interrupt_pins.len() != p.device_count {
            return Err(ConfigError::InterruptPinCountMismatch {
                expected: p.device_count,
                actual: p.interrupt_pins.len(),
            });
        }
        if p.addresses.len() != p.device_count {
            return Err(ConfigError::DeviceCountMismatch {
                expected: p.device_count,
                actual: p.addresses.len(),
            });
        }
        if !self.debounce.is_valid() {
            return Err(ConfigError::InvalidThresholds);
        }
        InputAddressMap::from_profile(p)
    }

    /// One cooperative step.  `now_ms` is monotonic milliseconds.
    pub fn poll<B: I2c>(&mut self, bus: &mut B, now_ms: u64) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        let Some(map) = self.map.as_ref() else {
            return;
        };

        let family = self.profile.family;
        for (index, device) in self.devices.iter_mut().enumerate() {
            if !device.enabled {
                continue;
            }

            if self.lines.is_asserted(device.interrupt_pin) {
                read_channels(family, device, bus, now_ms, &mut self.listener);
            }

            if device.enabled {
                evaluate_timers(index, device, map, &self.debounce, now_ms, &mut self.listener);
            }
        }
    }

    /// Bus status of every configured expander.  Empty until `begin()`
    /// succeeds.
    pub fn health(&self) -> HealthReport {
        let mut report = HealthReport::new();
        for d in &self.devices {
            report.push(d.address, d.enabled);
        }
        report
    }

    /// `true` once `begin()` succeeded with a valid profile.
    pub fn is_enabled(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// The configuration error that disabled the subsystem, if any.
    pub fn config_error(&self) -> Option<ConfigError> {
        match self.lifecycle {
            Lifecycle::Disabled(e) => Some(e),
            _ => None,
        }
    }

    pub fn devices(&self) -> &[InputDevice] {
        &self.devices
    }

    pub fn channel_state(&self, device: usize, bit: usize) -> Option<&InputChannelState> {
        self.devices.get(device)?.channels.get(bit)
    }

    /// Last observed contact state of a logical port.
    pub fn observed(&self, port: LogicalPort) -> Option<ContactState> {
        let (device, bit) = self.map.as_ref()?.locate(port)?;
        self.channel_state(device, bit).map(InputChannelState::observed)
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn lines_mut(&mut self) -> &mut G {
        &mut self.lines
    }
}

fn read_channels<F, B, L>(family: F, device: &mut InputDevice, bus: &mut B, now_ms: u64, listener: &mut L)
where
    F: InputExpander,
    B: I2c,
    L: FaultSink,
{
    let bits = match family.read_inputs(bus, device.address) {
        Ok(bits) => bits,
        Err(reason) => {
            fault_device(device, reason, listener);
            return;
        }
    };

    if bits == device.previous_bitmask {
        return;
    }
    device.previous_bitmask = bits;

    for (bit, ch) in device.channels.iter_mut().enumerate() {
        ch.observe(bits & (1 << bit) != 0, now_ms);
    }
}

fn evaluate_timers<L: PortEventSink>(
    index: usize,
    device: &mut InputDevice,
    map: &InputAddressMap,
    debounce: &DebounceConfig,
    now_ms: u64,
    listener: &mut L,
) {
    for (bit, ch) in device.channels.iter_mut().enumerate() {
        let Some(press) = ch.evaluate(now_ms, debounce) else {
            continue;
        };
        let Some(port) = map.resolve(index, bit) else {
            continue;
        };
        debug!("[inputs] {port} {press:?}");
        listener.on_port_event(port, press.is_long());
    }
}

fn fault_device<L: FaultSink>(device: &mut InputDevice, reason: FaultReason, listener: &mut L) {
    if !device.enabled {
        return;
    }
    if !reason.is_error() {
        warn!("[inputs] (fault) called with no error present");
        return;
    }
    device.enabled = false;
    error!("[inputs] expander 0x{:02x} offline: {}", device.address, reason);
    listener.on_device_fault(device.address, reason);
}
