//! # Vectorcam Pipeline
//!
//! The geometry-to-toolpath pipeline: takes the flat segment list extracted
//! from a 2D drawing and produces an ordered, depth-staged, offset-corrected
//! machine command stream.
//!
//! ## Stages
//!
//! ```text
//! Segment list (from format readers)
//!   -> cleaner      (deduplicate / drop degenerates)
//!   -> topology     (chain segments into closed/open objects)
//!   -> containment  (nesting levels, inside/outside offset side)
//!   -> offset       (tool-radius compensation via cavalier_contours,
//!                    pockets, overcut, drill-point fallback)
//!   -> sequencer    (cut order: deepest nesting first, nearest next)
//!   -> stager       (multi-pass depth expansion, helix entry)
//!   -> command stream (abstract rapid/linear/arc moves + metadata)
//! ```
//!
//! The whole pipeline is synchronous, single-threaded batch computation and
//! is rebuilt from scratch on every run; see [`pipeline::ToolpathPipeline`].
//! Machine-dialect text formatting is left to an external emitter consuming
//! [`machine::MachineCommand`] values.

pub mod cleaner;
pub mod containment;
pub mod machine;
pub mod offset;
pub mod pipeline;
pub mod sequencer;
pub mod stager;
pub mod topology;

pub use cleaner::clean_segments;
pub use containment::{analyze_containment, is_inside_polygon};
pub use machine::{CommandStream, MachineCommand};
pub use offset::{compute_offsets, OffsetCurve};
pub use pipeline::{PipelineError, PipelineOutput, ToolpathPipeline};
pub use sequencer::sequence_curves;
pub use stager::stage_curve;
pub use topology::build_objects;
