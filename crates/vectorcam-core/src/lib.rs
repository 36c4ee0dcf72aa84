//! # Vectorcam Core
//!
//! Core types shared by the vectorcam toolpath pipeline: 2D/3D points and
//! angle helpers, bulge-encoded arc math, the segment and object models, and
//! the per-object milling setup configuration.
//!
//! Segments are the common intermediate representation produced by the
//! (external) drawing-format readers. Objects are chained polygons/polylines
//! reconstructed from segments by the pipeline crate. Setups carry the
//! milling parameters (depth, step, offset side overrides, pocket and tab
//! settings) that travel with every object through the pipeline.

pub mod error;
pub mod geometry;
pub mod object;
pub mod segment;
pub mod setup;

pub use error::{GeometryError, GeometryResult};
pub use geometry::{
    angle_delta, arc_midpoint, bulge_to_arc, edge_length, face_probe, fuzzy_match, ArcGeometry,
    Point, FUZZY_DECIMALS,
};
pub use object::{CamObject, ToolOffsetSide};
pub use segment::{Segment, SegmentKind};
pub use setup::{MillSetup, PocketSetup, Setup, TabSetup, ToolSetup};
