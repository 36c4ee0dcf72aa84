//! Chained objects: connected polygons/polylines reconstructed from
//! segments by the topology builder.

use crate::geometry::Point;
use crate::segment::{Segment, SegmentKind};
use crate::setup::Setup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the curve the tool travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolOffsetSide {
    /// No offset: the tool follows the curve directly (open paths,
    /// engraving).
    None,
    /// The tool stays inside the curve (hole boundaries).
    Inside,
    /// The tool stays outside the curve (outer boundaries).
    Outside,
}

impl fmt::Display for ToolOffsetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOffsetSide::None => write!(f, "none"),
            ToolOffsetSide::Inside => write!(f, "inside"),
            ToolOffsetSide::Outside => write!(f, "outside"),
        }
    }
}

/// A connected chain of segments representing one polygon or polyline.
///
/// Invariants: each segment's `end` fuzzy-matches the next segment's
/// `start`; all segments share the object's layer; `closed` is true iff the
/// last segment's end fuzzy-matches the first segment's start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamObject {
    pub id: usize,
    pub segments: Vec<Segment>,
    pub closed: bool,
    pub tool_offset: ToolOffsetSide,
    /// Explicit offset distance overriding the tool-radius-derived one.
    pub overwrite_offset: Option<f64>,
    /// Ids of closed objects geometrically containing this one.
    pub outer_objects: Vec<usize>,
    /// Ids of objects this one contains (mutual with `outer_objects`).
    pub inner_objects: Vec<usize>,
    pub layer: String,
    pub setup: Setup,
}

impl CamObject {
    /// Creates an object from an already-chained segment list.
    pub fn new(id: usize, segments: Vec<Segment>, closed: bool, setup: Setup) -> Self {
        let layer = segments
            .first()
            .map(|s| s.layer.clone())
            .unwrap_or_default();
        Self {
            id,
            segments,
            closed,
            tool_offset: ToolOffsetSide::None,
            overwrite_offset: None,
            outer_objects: Vec::new(),
            inner_objects: Vec::new(),
            layer,
            setup,
        }
    }

    /// Start point of the chain.
    pub fn start_point(&self) -> Option<Point> {
        self.segments.first().map(|s| s.start)
    }

    /// End point of the chain.
    pub fn end_point(&self) -> Option<Point> {
        self.segments.last().map(|s| s.end)
    }

    /// Reverses the traversal direction: segment order flipped, each
    /// segment reversed (endpoints swapped, bulge negated).
    pub fn reverse(&mut self) {
        self.segments.reverse();
        for seg in &mut self.segments {
            *seg = seg.reversed();
        }
    }

    /// Nesting depth: number of closed objects containing this one.
    pub fn level(&self) -> usize {
        self.outer_objects.len()
    }

    /// Total traversal length of the chain in mm.
    pub fn path_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length()).sum()
    }

    /// True for closed objects sourced entirely from circle primitives.
    pub fn is_circle(&self) -> bool {
        self.closed
            && !self.segments.is_empty()
            && self.segments.iter().all(|s| s.kind == SegmentKind::Circle)
    }

    /// Center of a circle object, if this is one.
    pub fn circle_center(&self) -> Option<Point> {
        if !self.is_circle() {
            return None;
        }
        self.segments.first().and_then(|s| s.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Segment;

    fn square(id: usize) -> CamObject {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let segments = (0..4)
            .map(|i| Segment::new_line(pts[i], pts[(i + 1) % 4], "0"))
            .collect();
        CamObject::new(id, segments, true, Setup::default())
    }

    #[test]
    fn test_reverse_round_trip() {
        let original = square(0);
        let mut obj = original.clone();
        obj.reverse();
        assert_ne!(obj.segments, original.segments);
        obj.reverse();
        assert_eq!(obj.segments, original.segments);
    }

    #[test]
    fn test_reverse_keeps_chain_connected() {
        let mut obj = square(0);
        obj.reverse();
        for pair in obj.segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_path_length() {
        let obj = square(0);
        assert!((obj.path_length() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_circle_detection() {
        let center = Point::new(5.0, 5.0);
        let a = Segment::new_circle_arc(
            Point::new(4.0, 5.0),
            Point::new(6.0, 5.0),
            1.0,
            center,
            "0",
        )
        .unwrap();
        let b = Segment::new_circle_arc(
            Point::new(6.0, 5.0),
            Point::new(4.0, 5.0),
            1.0,
            center,
            "0",
        )
        .unwrap();
        let obj = CamObject::new(0, vec![a, b], true, Setup::default());
        assert!(obj.is_circle());
        assert_eq!(obj.circle_center(), Some(center));
        assert!(!square(1).is_circle());
    }
}
