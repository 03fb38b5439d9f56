//! Panel-wide health aggregation.
//!
//! Combines the per-family [`HealthReport`]s of both port managers into a
//! single snapshot for the external health query.  Serialised as JSON by
//! the main loop and the diagnostics endpoint.

use serde::{Deserialize, Serialize};

use crate::app::ports::{FaultSink, HealthReport, PortEventSink};
use crate::drivers::InterruptLines;
use crate::inputs::InputPortManager;
use crate::outputs::OutputPortManager;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelHealth {
    pub inputs: HealthReport,
    pub outputs: HealthReport,
}

impl PanelHealth {
    pub fn collect<G, LI, LO>(
        inputs: &InputPortManager<G, LI>,
        outputs: &OutputPortManager<LO>,
    ) -> Self
    where
        G: InterruptLines,
        LI: PortEventSink + FaultSink,
        LO: FaultSink,
    {
        Self {
            inputs: inputs.health(),
            outputs: outputs.health(),
        }
    }

    /// `true` if any configured device is offline, or a subsystem has no
    /// devices at all (disabled by its configuration).
    pub fn is_degraded(&self) -> bool {
        self.inputs.count() == 0
            || self.outputs.count() == 0
            || !self.inputs.all_enabled()
            || !self.outputs.all_enabled()
    }

    /// Number of devices currently offline across both families.
    pub fn offline_count(&self) -> usize {
        self.inputs.disabled().count() + self.outputs.disabled().count()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
