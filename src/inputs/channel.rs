//! Per-channel debounce and press classification.
//!
//! A channel is either at rest (its polarity-defined normal state) or
//! abnormal since some timestamp.  While abnormal, [`InputChannelState::evaluate`]
//! classifies how long it has been held:
//!
//! ```text
//!   0 ──── short_ms ──────────── long_ms ─────────▶ elapsed
//!   │ nothing │  Short (once)       │ Long (once, monitored only)
//! ```
//!
//! Returning to rest before `short_ms` discards the transition silently.

use crate::config::{DebounceConfig, Polarity};

/// Electrical state of a contact as read from the expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    Open,
    Closed,
}

impl ContactState {
    /// Inputs are pulled up: a low bit means the contact is closed.
    pub const fn from_bit(high: bool) -> Self {
        if high { Self::Open } else { Self::Closed }
    }
}

impl Polarity {
    /// State the contact sits in when nothing is happening.
    pub const fn rest_state(self) -> ContactState {
        match self {
            Self::NormallyOpen => ContactState::Open,
            Self::NormallyClosed => ContactState::Closed,
        }
    }
}

/// Classified duration of an abnormal interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Short,
    Long,
}

impl Press {
    pub const fn is_long(self) -> bool {
        matches!(self, Self::Long)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputChannelState {
    polarity: Polarity,
    monitor_long_press: bool,
    observed: ContactState,
    /// When the channel left its rest state; `None` while at rest.
    since_ms: Option<u64>,
    short_consumed: bool,
    long_consumed: bool,
}

impl InputChannelState {
    pub fn new(polarity: Polarity, monitor_long_press: bool) -> Self {
        Self {
            polarity,
            monitor_long_press,
            observed: polarity.rest_state(),
            since_ms: None,
            short_consumed: true,
            long_consumed: true,
        }
    }

    /// Seed from the first read.  Never produces an event, even when the
    /// channel is found outside its rest state.
    pub fn calibrate(&mut self, high: bool) {
        self.observed = ContactState::from_bit(high);
        self.settle();
    }

    /// Record a fresh sample.  Returns `true` if the observed state changed.
    pub fn observe(&mut self, high: bool, now_ms: u64) -> bool {
        let state = ContactState::from_bit(high);
        if state == self.observed {
            return false;
        }

        if state == self.polarity.rest_state() {
            self.settle();
        } else {
            self.since_ms = Some(now_ms);
            self.short_consumed = false;
            self.long_consumed = false;
        }
        self.observed = state;
        true
    }

    /// Classify the current abnormal interval.  Each kind fires at most
    /// once per interval.
    pub fn evaluate(&mut self, now_ms: u64, debounce: &DebounceConfig) -> Option<Press> {
        let since = self.since_ms?;
        let elapsed = now_ms.saturating_sub(since);

        if elapsed < debounce.short_ms {
            return None;
        }

        if elapsed < debounce.long_ms {
            if self.short_consumed {
                return None;
            }
            self.short_consumed = true;
            return Some(Press::Short);
        }

        if !self.monitor_long_press || self.long_consumed {
            return None;
        }
        self.long_consumed = true;
        Some(Press::Long)
    }

    fn settle(&mut self) {
        self.since_ms = None;
        self.short_consumed = true;
        self.long_consumed = true;
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn monitors_long_press(&self) -> bool {
        self.monitor_long_press
    }

    pub fn observed(&self) -> ContactState {
        self.observed
    }

    pub fn since_ms(&self) -> Option<u64> {
        self.since_ms
    }

    pub fn is_at_rest(&self) -> bool {
        self.since_ms.is_none()
    }

    pub fn short_consumed(&self) -> bool {
        self.short_consumed
    }

    pub fn long_consumed(&self) -> bool {
        self.long_consumed
    }
}
