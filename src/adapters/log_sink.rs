//! Log-based listener adapter.
//!
//! Implements both listener ports by writing to the ESP-IDF logger (UART
//! / USB-CDC in production).  Useful on its own during bring-up, or
//! wrapped around another listener with [`LogSink::wrap`].

use log::{error, info};

use crate::addressing::LogicalPort;
use crate::app::ports::{FaultSink, PortEventSink};
use crate::error::FaultReason;

/// Logs every event, then forwards it to `inner`.
#[derive(Debug, Default)]
pub struct LogSink<T = ()> {
    inner: T,
}

impl LogSink {
    pub fn new() -> Self {
        Self { inner: () }
    }
}

impl<T> LogSink<T> {
    pub fn wrap(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl PortEventSink for () {
    fn on_port_event(&mut self, _port: LogicalPort, _long_press: bool) {}
}

impl FaultSink for () {
    fn on_device_fault(&mut self, _address: u8, _reason: FaultReason) {}
}

impl<T: PortEventSink> PortEventSink for LogSink<T> {
    fn on_port_event(&mut self, port: LogicalPort, long_press: bool) {
        info!(
            "PORT  | {port} | {}",
            if long_press { "long" } else { "short" }
        );
        self.inner.on_port_event(port, long_press);
    }
}

impl<T: FaultSink> FaultSink for LogSink<T> {
    fn on_device_fault(&mut self, address: u8, reason: FaultReason) {
        if address == 0 {
            error!("FAULT | configuration | {reason} (code {})", reason.code());
        } else {
            error!(
                "FAULT | device 0x{address:02x} | {reason} (code {})",
                reason.code()
            );
        }
        self.inner.on_device_fault(address, reason);
    }
}
