//! Directed line/arc segments, the common intermediate representation
//! produced by drawing-format readers.

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{edge_length, Point};
use serde::{Deserialize, Serialize};

/// Origin primitive kind of a segment. Informational for most of the
/// pipeline; `Circle` enables the small-circle drill-point fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Line,
    Arc,
    Circle,
}

/// A directed primitive with bulge-encoded curvature.
///
/// `object` is the owning object's id once the topology builder has claimed
/// the segment; `None` marks it unclaimed. `center` is only meaningful for
/// arc/circle-sourced segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    pub bulge: f64,
    pub kind: SegmentKind,
    pub layer: String,
    pub object: Option<usize>,
    pub center: Option<Point>,
}

impl Segment {
    /// Creates a straight line segment.
    pub fn new_line(start: Point, end: Point, layer: impl Into<String>) -> Self {
        Self {
            start,
            end,
            bulge: 0.0,
            kind: SegmentKind::Line,
            layer: layer.into(),
            object: None,
            center: None,
        }
    }

    /// Creates an arc segment, validating the bulge invariant: a non-zero
    /// bulge requires distinct endpoints.
    pub fn new_arc(
        start: Point,
        end: Point,
        bulge: f64,
        center: Point,
        layer: impl Into<String>,
    ) -> GeometryResult<Self> {
        if !start.is_finite() || !end.is_finite() || !bulge.is_finite() {
            return Err(GeometryError::NonFiniteCoordinate);
        }
        if bulge != 0.0 && start.distance_to(&end) < 1e-9 {
            return Err(GeometryError::DegenerateArc {
                x: start.x,
                y: start.y,
            });
        }
        Ok(Self {
            start,
            end,
            bulge,
            kind: SegmentKind::Arc,
            layer: layer.into(),
            object: None,
            center: Some(center),
        })
    }

    /// Creates a circle-sourced arc segment (half of a full circle as
    /// emitted by DXF readers).
    pub fn new_circle_arc(
        start: Point,
        end: Point,
        bulge: f64,
        center: Point,
        layer: impl Into<String>,
    ) -> GeometryResult<Self> {
        let mut seg = Self::new_arc(start, end, bulge, center, layer)?;
        seg.kind = SegmentKind::Circle;
        Ok(seg)
    }

    /// Returns the segment traversed in the opposite direction: endpoints
    /// swapped, bulge negated.
    pub fn reversed(&self) -> Segment {
        Segment {
            start: self.end,
            end: self.start,
            bulge: -self.bulge,
            kind: self.kind,
            layer: self.layer.clone(),
            object: self.object,
            center: self.center,
        }
    }

    /// Traversal length (chord for lines, arc length for bulged segments).
    pub fn length(&self) -> f64 {
        edge_length(self.start, self.end, self.bulge)
    }

    /// A segment is degenerate when it carries non-finite coordinates or is
    /// a zero-length straight line. Such segments are dropped by the
    /// cleaner.
    pub fn is_degenerate(&self) -> bool {
        if !self.start.is_finite() || !self.end.is_finite() || !self.bulge.is_finite() {
            return true;
        }
        self.bulge == 0.0 && self.start.distance_to(&self.end) < 1e-9
    }
}
