//! Outbound panel events.
//!
//! [`EventRecorder`] implements both listener ports by queueing
//! [`PanelEvent`]s into a fixed-capacity deque.  The main loop drains it
//! after each poll and forwards events to the event log, MQTT, or the
//! display, none of which belong in the I/O core.

use heapless::Deque;

use super::ports::{FaultSink, PortEventSink};
use crate::addressing::LogicalPort;
use crate::error::FaultReason;

/// Pending events held between drains.
pub const EVENT_QUEUE_CAP: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    /// A classified input transition.
    Port { port: LogicalPort, long_press: bool },
    /// A device was taken offline.
    DeviceFault { address: u8, reason: FaultReason },
}

/// Queueing listener.  When full, the oldest event is dropped.
#[derive(Debug, Default)]
pub struct EventRecorder {
    queue: Deque<PanelEvent, EVENT_QUEUE_CAP>,
    dropped: u32,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, event: PanelEvent) {
        if self.queue.is_full() {
            self.queue.pop_front();
            self.dropped = self.dropped.saturating_add(1);
        }
        let _ = self.queue.push_back(event);
    }

    pub fn pop(&mut self) -> Option<PanelEvent> {
        self.queue.pop_front()
    }

    /// Drain all pending events into a callback, oldest first.
    pub fn drain(&mut self, mut handler: impl FnMut(PanelEvent)) {
        while let Some(event) = self.queue.pop_front() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Events lost to overflow since construction.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Port events currently queued, in order.
    pub fn port_events(&self) -> impl Iterator<Item = (LogicalPort, bool)> + '_ {
        self.queue.iter().filter_map(|e| match *e {
            PanelEvent::Port { port, long_press } => Some((port, long_press)),
            PanelEvent::DeviceFault { .. } => None,
        })
    }

    /// Device faults currently queued, in order.
    pub fn faults(&self) -> impl Iterator<Item = (u8, FaultReason)> + '_ {
        self.queue.iter().filter_map(|e| match *e {
            PanelEvent::DeviceFault { address, reason } => Some((address, reason)),
            PanelEvent::Port { .. } => None,
        })
    }
}

impl PortEventSink for EventRecorder {
    fn on_port_event(&mut self, port: LogicalPort, long_press: bool) {
        self.record(PanelEvent::Port { port, long_press });
    }
}

impl FaultSink for EventRecorder {
    fn on_device_fault(&mut self, address: u8, reason: FaultReason) {
        self.record(PanelEvent::DeviceFault { address, reason });
    }
}
