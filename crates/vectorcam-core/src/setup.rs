//! Per-object milling setup configuration.
//!
//! Every object carries its own copy of these parameters, seeded from the
//! run defaults so hosts can override depth, direction, pocketing and tab
//! settings per object. All types serialize to JSON for setup persistence.

use serde::{Deserialize, Serialize};

/// Tool parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSetup {
    /// Cutter diameter in mm.
    pub diameter: f64,
    /// Tool number for the emitter's tool-change prologue.
    pub number: u32,
    /// Spindle speed in RPM.
    pub speed: f64,
    /// Feed rate in mm/min.
    pub feed: f64,
}

impl Default for ToolSetup {
    fn default() -> Self {
        Self {
            diameter: 4.0,
            number: 1,
            speed: 10000.0,
            feed: 1000.0,
        }
    }
}

/// Milling parameters for profile cuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillSetup {
    /// Whether this object is milled at all.
    pub active: bool,
    /// Final target depth in mm, negative below stock top.
    pub depth: f64,
    /// Per-pass depth increment in mm, negative.
    pub step: f64,
    /// Flip cut direction (climb vs conventional).
    pub reverse: bool,
    /// Ramp the first pass helically instead of plunging.
    pub helix_mode: bool,
    /// Insert corner relief cuts at sharp inside corners.
    pub overcut: bool,
    /// Synthesize drill points for circles smaller than the tool.
    pub small_circles: bool,
    /// Z height for rapid moves between cuts, positive above stock.
    pub fast_move_z: f64,
    /// Rapid back to the XY origin after the last cut.
    pub back_home: bool,
    /// Path-blending tolerance (G64 P value) passed through to the emitter.
    pub g64: Option<f64>,
}

impl Default for MillSetup {
    fn default() -> Self {
        Self {
            active: true,
            depth: -2.0,
            step: -2.0,
            reverse: false,
            helix_mode: false,
            overcut: false,
            small_circles: false,
            fast_move_z: 5.0,
            back_home: true,
            g64: Some(0.05),
        }
    }
}

impl MillSetup {
    /// Step value guaranteed to be negative so depth staging always
    /// terminates. A zero or positive step is normalized rather than
    /// rejected.
    pub fn sanitized_step(&self) -> f64 {
        if self.step < 0.0 {
            self.step
        } else if self.step > 0.0 {
            -self.step
        } else {
            -2.0
        }
    }

    /// Final depth clamped to never sit above the stock top.
    pub fn sanitized_depth(&self) -> f64 {
        self.depth.min(0.0)
    }
}

/// Pocket-clearing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PocketSetup {
    /// Clear the interior of inside-offset objects.
    pub active: bool,
}

impl Default for PocketSetup {
    fn default() -> Self {
        Self { active: false }
    }
}

/// Holding-tab parameters, carried through for the emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabSetup {
    pub active: bool,
    /// Tab width in mm along the path.
    pub width: f64,
    /// Tab height in mm above the final depth.
    pub height: f64,
}

impl Default for TabSetup {
    fn default() -> Self {
        Self {
            active: false,
            width: 10.0,
            height: 2.0,
        }
    }
}

/// Complete milling configuration for one object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Setup {
    pub tool: ToolSetup,
    pub mill: MillSetup,
    pub pockets: PocketSetup,
    pub tabs: TabSetup,
}
