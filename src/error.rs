//! Fault taxonomy and error types shared by the input and output managers.
//!
//! Three categories of failure exist in the port I/O layer:
//!
//! | Category              | Type            | Reported via                  |
//! |-----------------------|-----------------|-------------------------------|
//! | Configuration error   | [`ConfigError`] | `begin()` result + one fault  |
//! | Device fault          | [`FaultReason`] | [`FaultSink`] callback        |
//! | Caller misuse         | result values   | synchronous return            |
//!
//! All variants are `Copy` so they can be handed to listeners without
//! allocation.
//!
//! [`FaultSink`]: crate::app::ports::FaultSink

use core::fmt;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Device fault reasons
// ---------------------------------------------------------------------------

/// Why a device was taken offline.
///
/// Codes 0..=11 follow the numeric result of a bus transaction; codes
/// from 20 upward are raised by device-family drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FaultReason {
    /// The transaction succeeded.
    NoError = 0,
    /// Data too long to fit in the transmit buffer.
    TransmitBufferTooLong = 1,
    /// NACK received on transmit of the address.
    AddressOffline = 2,
    /// NACK received on transmit of data.
    DataNack = 3,
    /// Other bus error.
    Other = 4,
    /// The transaction timed out.
    Timeout = 5,
    /// The static hardware profile is inconsistent.
    InvalidHardwareConfiguration = 10,
    /// Unknown or undocumented failure.
    Unknown = 11,
    /// A pin index beyond the device's channel count was addressed.
    ChannelOutOfRange = 20,
    /// A mode register did not read back the value written to it.
    InvalidModeRegister = 21,
}

impl FaultReason {
    /// Map a numeric bus result code.
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::NoError,
            1 => Self::TransmitBufferTooLong,
            2 => Self::AddressOffline,
            3 => Self::DataNack,
            4 => Self::Other,
            5 => Self::Timeout,
            10 => Self::InvalidHardwareConfiguration,
            _ => Self::Unknown,
        }
    }

    /// Numeric code for this reason.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Classify an `embedded-hal` I2C error.
    pub fn from_bus_error<E: embedded_hal::i2c::Error>(err: &E) -> Self {
        Self::from(err.kind())
    }

    pub const fn is_error(self) -> bool {
        !matches!(self, Self::NoError)
    }
}

impl From<ErrorKind> for FaultReason {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => Self::DataNack,
            ErrorKind::NoAcknowledge(_) => Self::AddressOffline,
            ErrorKind::Overrun => Self::TransmitBufferTooLong,
            ErrorKind::Bus | ErrorKind::ArbitrationLoss => Self::Other,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for FaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoError => write!(f, "no error"),
            Self::TransmitBufferTooLong => write!(f, "data too long for transmit buffer"),
            Self::AddressOffline => write!(f, "address offline (NACK)"),
            Self::DataNack => write!(f, "data not acknowledged"),
            Self::Other => write!(f, "bus error"),
            Self::Timeout => write!(f, "timeout"),
            Self::InvalidHardwareConfiguration => write!(f, "invalid hardware configuration"),
            Self::Unknown => write!(f, "unknown error"),
            Self::ChannelOutOfRange => write!(f, "channel out of range"),
            Self::InvalidModeRegister => write!(f, "invalid mode register"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Why a hardware profile was rejected at `begin()`.
///
/// Any of these takes the whole subsystem offline; the fault listener sees
/// a single [`FaultReason::InvalidHardwareConfiguration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Address list length differs from the configured device count.
    DeviceCountMismatch { expected: usize, actual: usize },
    /// Interrupt pin list length differs from the configured device count.
    InterruptPinCountMismatch { expected: usize, actual: usize },
    /// More devices or pins than the compiled capacity.
    TooManyDevices,
    /// The bit → (port, channel) map does not cover every pin.
    ChannelMapLength { expected: usize, actual: usize },
    /// Two bits resolve to the same logical port/channel.
    ChannelMapCollision { port: u8, channel: u8 },
    /// An output pin has no port assigned (zero entry).
    UnmappedOutputPin { device: usize, pin: usize },
    /// The same output port number appears twice.
    DuplicateOutputPort(u8),
    /// Offsetting the channel map for the last device exceeds port 255.
    PortNumberOverflow { port: usize },
    /// Short threshold must be below the long threshold.
    InvalidThresholds,
    /// PWM full-scale value is zero.
    InvalidFullScale,
    /// `begin()` was already called on this manager.
    AlreadyInitialized,
}

impl ConfigError {
    /// The fault reason reported to listeners for this error.
    pub const fn reason(self) -> FaultReason {
        FaultReason::InvalidHardwareConfiguration
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceCountMismatch { expected, actual } => {
                write!(f, "{actual} addresses configured for {expected} devices")
            }
            Self::InterruptPinCountMismatch { expected, actual } => {
                write!(f, "{actual} interrupt pins configured for {expected} devices")
            }
            Self::TooManyDevices => write!(f, "device or pin count exceeds capacity"),
            Self::ChannelMapLength { expected, actual } => {
                write!(f, "channel map has {actual} entries, expected {expected}")
            }
            Self::ChannelMapCollision { port, channel } => {
                write!(f, "port {port} channel {channel} mapped twice")
            }
            Self::UnmappedOutputPin { device, pin } => {
                write!(f, "output device {device} pin {pin} has no port")
            }
            Self::DuplicateOutputPort(port) => write!(f, "output port {port} mapped twice"),
            Self::PortNumberOverflow { port } => {
                write!(f, "last device would need port {port}, beyond 255")
            }
            Self::InvalidThresholds => write!(f, "short threshold must be below long threshold"),
            Self::InvalidFullScale => write!(f, "PWM full scale must be non-zero"),
            Self::AlreadyInitialized => write!(f, "already initialized"),
        }
    }
}

impl From<ConfigError> for FaultReason {
    fn from(e: ConfigError) -> Self {
        e.reason()
    }
}

// ---------------------------------------------------------------------------
// Port label errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortIdError {
    /// No channel owns the requested port.
    UnknownPort(u8),
    /// Label longer than [`PORT_ID_MAX_LENGTH`](crate::config::PORT_ID_MAX_LENGTH).
    TooLong,
}

impl fmt::Display for PortIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPort(port) => write!(f, "unknown port {port}"),
            Self::TooLong => write!(f, "port id too long"),
        }
    }
}
