//! Output Port Manager.
//!
//! Maps logical output ports to `(controller, pin)` pairs and drives them
//! through the PWM controller family.  Writes are clamped, deadbanded and
//! quantized to ticks; a write whose ticks equal the value already held by
//! the hardware returns [`SetPortResult::Excessive`] without touching the
//! bus.
//!
//! A bus error takes the owning controller offline for good and with it
//! every channel on that controller.  Sibling controllers keep working.

pub mod channel;

use embedded_hal::i2c::I2c;
use heapless::Vec;
use log::{debug, error, info, warn};

use crate::addressing::OutputAddressMap;
use crate::app::ports::{FaultSink, HealthReport};
use crate::config::{MAX_OUTPUT_DEVICES, MAX_PINS_PER_DEVICE, OutputProfile};
use crate::drivers::PwmController;
use crate::error::{ConfigError, FaultReason, PortIdError};

pub use channel::{
    OutputChannelState, OutputType, SetPortResult, effective_percent, percent_to_ticks,
    ticks_to_percent,
};

/// One PWM controller and the channels it drives.
#[derive(Debug, Clone)]
pub struct OutputDevice {
    address: u8,
    enabled: bool,
    channels: Vec<OutputChannelState, MAX_PINS_PER_DEVICE>,
}

impl OutputDevice {
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn channels(&self) -> &[OutputChannelState] {
        &self.channels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Running,
    Disabled(ConfigError),
}

pub struct OutputPortManager<L> {
    profile: OutputProfile,
    devices: Vec<OutputDevice, MAX_OUTPUT_DEVICES>,
    listener: L,
    lifecycle: Lifecycle,
}

impl<L: FaultSink> OutputPortManager<L> {
    pub fn new(profile: OutputProfile, listener: L) -> Self {
        Self {
            profile,
            devices: Vec::new(),
            listener,
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    /// Validate the profile, then reset every controller, force all of its
    /// outputs off and program the PWM frequency.
    pub fn begin<B: I2c>(&mut self, bus: &mut B) -> Result<(), ConfigError> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return Err(ConfigError::AlreadyInitialized);
        }

        let devices = match self.build_devices() {
            Ok(devices) => devices,
            Err(e) => {
                error!("[outputs] (begin) {e}; disabling outputs");
                self.lifecycle = Lifecycle::Disabled(e);
                self.listener
                    .on_device_fault(0, FaultReason::InvalidHardwareConfiguration);
                return Err(e);
            }
        };
        self.devices = devices;

        let family = self.profile.family;
        let frequency_hz = self.profile.frequency_hz;
        for device in &mut self.devices {
            let configured = family.configure(bus, device.address);
            let result = match configured {
                Err(FaultReason::AddressOffline) => configured,
                // Anything that acknowledged is forced off, even if it is then faulted.
                _ => {
                    let off = family.all_off(bus, device.address);
                    configured
                        .and(off)
                        .and_then(|()| family.set_frequency(bus, device.address, frequency_hz))
                }
            };
            if let Err(reason) = result {
                fault_device(device, reason, &mut self.listener);
            }
        }

        self.lifecycle = Lifecycle::Running;
        info!(
            "[outputs] (begin) {} controllers, {} online, {} Hz",
            self.devices.len(),
            self.devices.iter().filter(|d| d.enabled).count(),
            frequency_hz
        );
        Ok(())
    }

    fn build_devices(&self) -> Result<Vec<OutputDevice, MAX_OUTPUT_DEVICES>, ConfigError> {
        let p = &self.profile;
        if p.addresses.len() != p.device_count {
            return Err(ConfigError::DeviceCountMismatch {
                expected: p.device_count,
                actual: p.addresses.len(),
            });
        }
        if p.full_scale == 0 {
            return Err(ConfigError::InvalidFullScale);
        }
        let map = OutputAddressMap::from_profile(p)?;

        let mut devices = Vec::new();
        for (index, &address) in p.addresses.iter().enumerate() {
            let mut channels = Vec::new();
            for pin in 0..p.pins_per_device {
                let port = map
                    .port(index, pin)
                    .ok_or(ConfigError::UnmappedOutputPin { device: index, pin })?;
                let output_type = if p.variable_ports.contains(&port) {
                    OutputType::Variable
                } else {
                    OutputType::Binary
                };
                channels
                    .push(OutputChannelState::new(port, pin, output_type))
                    .map_err(|_| ConfigError::TooManyDevices)?;
            }
            devices
                .push(OutputDevice {
                    address,
                    enabled: true,
                    channels,
                })
                .map_err(|_| ConfigError::TooManyDevices)?;
        }
        Ok(devices)
    }

    /// Drive `port` to `percent` (clamped to 0..=100).
    pub fn set_port_value<B: I2c>(&mut self, bus: &mut B, port: u8, percent: u8) -> SetPortResult {
        let (d, c) = match self.lookup(port) {
            Ok(found) => found,
            Err(result) => return result,
        };
        if !self.devices[d].enabled {
            return SetPortResult::ControllerNotEnabled;
        }
        if !self.devices[d].channels[c].enabled {
            return SetPortResult::PortNotEnabled;
        }
        self.write(bus, d, c, percent)
    }

    /// Last commanded level of `port` in percent; 0 for unknown ports.
    pub fn get_port_value(&self, port: u8) -> u8 {
        self.find(port)
            .map(|ch| ticks_to_percent(ch.last_ticks, self.profile.full_scale))
            .unwrap_or(0)
    }

    /// Disabling forces the output to zero first.  Enabling only sets the
    /// flag; the previous level is not restored.
    pub fn enable_port<B: I2c>(&mut self, bus: &mut B, port: u8, enabled: bool) -> SetPortResult {
        let (d, c) = match self.lookup(port) {
            Ok(found) => found,
            Err(result) => return result,
        };

        if enabled {
            self.devices[d].channels[c].enabled = true;
            return SetPortResult::Success;
        }

        let result = if self.devices[d].enabled {
            match self.write(bus, d, c, 0) {
                SetPortResult::Excessive => SetPortResult::Success,
                other => other,
            }
        } else {
            SetPortResult::ControllerNotEnabled
        };
        self.devices[d].channels[c].enabled = false;
        debug!("[outputs] port {port} disabled ({result:?})");
        result
    }

    pub fn set_port_id(&mut self, port: u8, label: &str) -> Result<(), PortIdError> {
        let mut id = heapless::String::new();
        id.push_str(label).map_err(|()| PortIdError::TooLong)?;
        let ch = self
            .find_mut(port)
            .ok_or(PortIdError::UnknownPort(port))?;
        ch.label = id;
        Ok(())
    }

    pub fn port_id(&self, port: u8) -> Option<&str> {
        self.find(port).map(OutputChannelState::label)
    }

    pub fn port_type(&self, port: u8) -> Option<OutputType> {
        self.find(port).map(OutputChannelState::output_type)
    }

    /// Every configured port number, controller by controller.
    pub fn ports(&self) -> impl Iterator<Item = u8> + '_ {
        self.devices
            .iter()
            .flat_map(|d| d.channels.iter().map(OutputChannelState::port))
    }

    /// Bus status of every configured controller.  Empty until `begin()`
    /// succeeds.
    pub fn health(&self) -> HealthReport {
        let mut report = HealthReport::new();
        for d in &self.devices {
            report.push(d.address, d.enabled);
        }
        report
    }

    pub fn is_enabled(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn config_error(&self) -> Option<ConfigError> {
        match self.lifecycle {
            Lifecycle::Disabled(e) => Some(e),
            _ => None,
        }
    }

    pub fn devices(&self) -> &[OutputDevice] {
        &self.devices
    }

    pub fn channel_state(&self, port: u8) -> Option<&OutputChannelState> {
        self.find(port)
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    fn lookup(&self, port: u8) -> Result<(usize, usize), SetPortResult> {
        if self.lifecycle != Lifecycle::Running {
            return Err(SetPortResult::ControllerNotEnabled);
        }
        self.devices
            .iter()
            .enumerate()
            .find_map(|(d, dev)| {
                dev.channels
                    .iter()
                    .position(|ch| ch.port() == port)
                    .map(|c| (d, c))
            })
            .ok_or(SetPortResult::InvalidPort)
    }

    fn find(&self, port: u8) -> Option<&OutputChannelState> {
        self.devices
            .iter()
            .flat_map(|d| d.channels.iter())
            .find(|ch| ch.port() == port)
    }

    fn find_mut(&mut self, port: u8) -> Option<&mut OutputChannelState> {
        self.devices
            .iter_mut()
            .flat_map(|d| d.channels.iter_mut())
            .find(|ch| ch.port() == port)
    }

    fn write<B: I2c>(&mut self, bus: &mut B, d: usize, c: usize, percent: u8) -> SetPortResult {
        let family = self.profile.family;
        let full_scale = self.profile.full_scale;
        let device = &mut self.devices[d];
        let address = device.address;
        let ch = &device.channels[c];

        let ticks = percent_to_ticks(percent, ch.output_type(), full_scale);
        if ticks == ch.last_ticks {
            return SetPortResult::Excessive;
        }
        let (port, pin) = (ch.port(), ch.pin());

        match family.write_ticks(bus, address, pin, ticks, full_scale) {
            Ok(()) => {
                device.channels[c].last_ticks = ticks;
                debug!("[outputs] port {port} <- {ticks}/{full_scale}");
                SetPortResult::Success
            }
            Err(reason) => {
                fault_device(device, reason, &mut self.listener);
                SetPortResult::Failed
            }
        }
    }
}

fn fault_device<L: FaultSink>(device: &mut OutputDevice, reason: FaultReason, listener: &mut L) {
    if !device.enabled {
        return;
    }
    if !reason.is_error() {
        warn!("[outputs] (fault) called with no error present");
        return;
    }
    device.enabled = false;
    error!("[outputs] controller 0x{:02x} offline: {}", device.address, reason);
    listener.on_device_fault(device.address, reason);
}
