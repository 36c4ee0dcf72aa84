//! Point primitives and angle/bulge math.
//!
//! Curvature follows the DXF bulge convention: `bulge = tan(theta / 4)` where
//! `theta` is the included arc angle. Positive bulge curves counter-clockwise
//! from start to end, negative clockwise, zero is a straight line.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of decimals used by [`fuzzy_match`] when chaining segment endpoints.
pub const FUZZY_DECIMALS: i32 = 2;

/// A point in machine space. Z is zero for 2D drawing geometry and only
/// becomes meaningful once the depth stager expands passes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    /// Creates a point in the XY plane (Z = 0).
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Creates a point with an explicit Z coordinate.
    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 2D (XY plane) distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Angle of the XY vector from this point to `other`, in radians.
    pub fn angle_to(&self, other: &Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Midpoint between this point and `other` (XY plane).
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// True if all coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Fuzzy endpoint equality used when chaining segments into objects: both
/// coordinates are independently rounded to [`FUZZY_DECIMALS`] decimals and
/// compared exactly.
pub fn fuzzy_match(a: Point, b: Point) -> bool {
    round_to(a.x, FUZZY_DECIMALS) == round_to(b.x, FUZZY_DECIMALS)
        && round_to(a.y, FUZZY_DECIMALS) == round_to(b.y, FUZZY_DECIMALS)
}

/// Signed angular difference `to - from`, normalized into `(-pi, pi]`.
pub fn angle_delta(from: f64, to: f64) -> f64 {
    let mut delta = to - from;
    while delta <= -PI {
        delta += 2.0 * PI;
    }
    while delta > PI {
        delta -= 2.0 * PI;
    }
    delta
}

/// Probe point used to canonicalize closed-object winding: 1.5 units to the
/// left of the travel direction at the segment's halfway point. For arcs the
/// probe hangs off the apex, where travel runs parallel to the chord; the
/// chord midpoint would sit on the wrong side of strongly bulged segments.
pub fn face_probe(start: Point, end: Point, bulge: f64) -> Point {
    let angle = start.angle_to(&end);
    let mid = arc_midpoint(start, end, bulge);
    Point::new(mid.x - 1.5 * angle.sin(), mid.y + 1.5 * angle.cos())
}

/// Center and radius of the arc described by a chord plus bulge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: Point,
    pub radius: f64,
}

/// Resolves the arc described by `start`, `end` and a non-zero bulge.
///
/// Returns `None` for straight segments (zero bulge) or a degenerate chord.
pub fn bulge_to_arc(start: Point, end: Point, bulge: f64) -> Option<ArcGeometry> {
    if bulge == 0.0 {
        return None;
    }
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let chord = (dx * dx + dy * dy).sqrt();
    if chord < 1e-12 {
        return None;
    }
    let sagitta = bulge.abs() * chord / 2.0;
    let radius = chord * (1.0 + bulge * bulge) / (4.0 * bulge.abs());
    let mid = start.midpoint(&end);
    // Left normal of the chord direction; the signed distance from chord
    // midpoint to center is (radius - sagitta) towards the left for positive
    // bulge and the mirror for negative. Major arcs (|bulge| > 1) make the
    // distance negative, which flips the side automatically.
    let nx = -dy / chord;
    let ny = dx / chord;
    let offset = (radius - sagitta) * bulge.signum();
    Some(ArcGeometry {
        center: Point::new(mid.x + nx * offset, mid.y + ny * offset),
        radius,
    })
}

/// Point on the arc halfway between `start` and `end`: the chord midpoint
/// displaced by the sagitta towards the bulge side. Falls back to the chord
/// midpoint for straight segments.
pub fn arc_midpoint(start: Point, end: Point, bulge: f64) -> Point {
    let mid = start.midpoint(&end);
    // Sagitta is |bulge| * chord / 2. A positive bulge sweeps CCW with the
    // apex to the right of the chord (the center sits on the left), so the
    // right normal scaled by bulge / 2 lands exactly on the arc.
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    Point::new(mid.x + dy * bulge / 2.0, mid.y - dx * bulge / 2.0)
}

/// Traversal length of a line or arc edge given its bulge.
pub fn edge_length(start: Point, end: Point, bulge: f64) -> f64 {
    match bulge_to_arc(start, end, bulge) {
        Some(arc) => {
            let theta = 4.0 * bulge.atan();
            arc.radius * theta.abs()
        }
        None => start.distance_to(&end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_match_rounding() {
        let a = Point::new(10.004, -3.996);
        let b = Point::new(10.0, -4.0);
        assert!(fuzzy_match(a, b));
        let c = Point::new(10.006, -4.0);
        assert!(!fuzzy_match(c, b));
    }

    #[test]
    fn test_angle_delta_wraps() {
        let d = angle_delta(3.0, -3.0);
        assert!((d - (2.0 * PI - 6.0)).abs() < 1e-12);
        assert!(angle_delta(0.0, PI) <= PI);
        assert!(angle_delta(0.0, PI) > 0.0);
        assert!((angle_delta(0.5, 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_bulge_quarter_circle() {
        // Quarter arc of the unit circle from (1, 0) to (0, 1), CCW.
        let bulge = (PI / 8.0).tan();
        let arc = bulge_to_arc(Point::new(1.0, 0.0), Point::new(0.0, 1.0), bulge).unwrap();
        assert!((arc.radius - 1.0).abs() < 1e-9);
        assert!(arc.center.x.abs() < 1e-9);
        assert!(arc.center.y.abs() < 1e-9);
    }

    #[test]
    fn test_bulge_semicircle_center_on_chord() {
        let arc = bulge_to_arc(Point::new(-5.0, 0.0), Point::new(5.0, 0.0), 1.0).unwrap();
        assert!((arc.radius - 5.0).abs() < 1e-9);
        assert!(arc.center.x.abs() < 1e-9);
        assert!(arc.center.y.abs() < 1e-9);
    }

    #[test]
    fn test_bulge_sign_selects_side() {
        let ccw = bulge_to_arc(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 0.5).unwrap();
        let cw = bulge_to_arc(Point::new(0.0, 0.0), Point::new(10.0, 0.0), -0.5).unwrap();
        assert!((ccw.center.y + cw.center.y).abs() < 1e-9);
        assert!(ccw.center.y > 0.0);
        assert!(cw.center.y < 0.0);
    }

    #[test]
    fn test_arc_midpoint_on_circle() {
        // CCW semicircle of radius 5 around the origin, west to east: the
        // sweep runs under the chord, apex at (0, -5).
        let mid = arc_midpoint(Point::new(-5.0, 0.0), Point::new(5.0, 0.0), 1.0);
        assert!((mid.x).abs() < 1e-12);
        assert!((mid.y + 5.0).abs() < 1e-12);
        // Straight edge degrades to the chord midpoint.
        let flat = arc_midpoint(Point::new(0.0, 0.0), Point::new(4.0, 0.0), 0.0);
        assert!((flat.x - 2.0).abs() < 1e-12);
        assert!(flat.y.abs() < 1e-12);
    }

    #[test]
    fn test_edge_length_line_and_arc() {
        let line = edge_length(Point::new(0.0, 0.0), Point::new(3.0, 4.0), 0.0);
        assert!((line - 5.0).abs() < 1e-12);
        // Semicircle of radius 5: length = pi * r.
        let arc = edge_length(Point::new(-5.0, 0.0), Point::new(5.0, 0.0), 1.0);
        assert!((arc - PI * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_face_probe_left_of_travel() {
        // Travelling +X: left side is +Y.
        let probe = face_probe(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 0.0);
        assert!((probe.x - 5.0).abs() < 1e-12);
        assert!((probe.y - 1.5).abs() < 1e-12);
        // CCW semicircle sweeping under the chord: probe hangs 1.5 above
        // the apex at (5, -5).
        let arc_probe = face_probe(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);
        assert!((arc_probe.x - 5.0).abs() < 1e-12);
        assert!((arc_probe.y + 3.5).abs() < 1e-12);
    }
}
