//! Pipeline orchestration: drives the stages end to end.
//!
//! The full run is a pure batch computation: segments in, command stream
//! out. Hosts that let the user edit per-object setups keep the object map
//! around and re-enter at [`ToolpathPipeline::generate`] without repeating
//! the geometry analysis.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{info, warn};
use vectorcam_core::{CamObject, Segment, Setup};

use crate::cleaner::clean_segments;
use crate::containment::analyze_containment;
use crate::machine::CommandStream;
use crate::offset::{compute_offsets, OffsetCurve};
use crate::sequencer::sequence_curves;
use crate::stager::stage_curve;
use crate::topology::build_objects;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no usable input segments")]
    NoSegments,
    #[error("nothing to mill: all objects are inactive")]
    NothingToMill,
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result of a full pipeline run, kept for inspection by the host.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Chained objects with containment fields filled in.
    pub objects: BTreeMap<usize, CamObject>,
    /// Offset curves in final cut order.
    pub curves: Vec<OffsetCurve>,
    /// The staged command stream.
    pub commands: CommandStream,
    /// Deepest nesting level found.
    pub max_level: usize,
}

/// Drives the geometry-to-toolpath pipeline with one global setup.
///
/// Objects are created with a clone of this setup; a host may override
/// individual objects' setups before calling [`generate`](Self::generate).
#[derive(Debug, Clone)]
pub struct ToolpathPipeline {
    setup: Setup,
}

impl ToolpathPipeline {
    pub fn new(setup: Setup) -> Self {
        Self { setup }
    }

    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    /// Runs every stage on a raw segment list.
    pub fn run(&self, segments: &[Segment]) -> PipelineResult<PipelineOutput> {
        let cleaned = clean_segments(segments);
        if cleaned.is_empty() {
            warn!("pipeline input empty after cleaning");
            return Err(PipelineError::NoSegments);
        }
        let mut objects = build_objects(cleaned, &self.setup);
        let max_level = analyze_containment(&mut objects);
        self.generate(objects, max_level)
    }

    /// Regenerates the toolpath from already-analyzed objects.
    ///
    /// Entry point for recalculation after per-object setup edits; skips
    /// cleaning, chaining and containment.
    pub fn generate(
        &self,
        objects: BTreeMap<usize, CamObject>,
        max_level: usize,
    ) -> PipelineResult<PipelineOutput> {
        if !objects.values().any(|o| o.setup.mill.active) {
            return Err(PipelineError::NothingToMill);
        }

        let curves = compute_offsets(
            self.setup.tool.diameter,
            &objects,
            max_level,
            self.setup.mill.small_circles,
        );
        let curves = sequence_curves(curves, max_level);

        let mut stream = CommandStream::new();
        for (order, curve) in curves.iter().enumerate() {
            stage_curve(curve, order, &mut stream);
        }
        if self.setup.mill.back_home && !stream.is_empty() {
            stream.rapid_move(0.0, 0.0, self.setup.mill.fast_move_z);
        }

        info!(
            objects = objects.len(),
            curves = curves.len(),
            commands = stream.len(),
            max_level,
            "toolpath generated"
        );
        Ok(PipelineOutput {
            objects,
            curves,
            commands: stream,
            max_level,
        })
    }
}
