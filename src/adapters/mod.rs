//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements             | Connects to              |
//! |------------|------------------------|--------------------------|
//! | `hardware` | InterruptLines         | ESP32 GPIO               |
//! | `log_sink` | PortEventSink          | Serial log output        |
//! |            | FaultSink              |                          |
//! | `time`     | (clock)                | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
pub mod time;
