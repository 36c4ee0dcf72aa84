//! Offset engine adapter: tool-radius compensation via `cavalier_contours`.
//!
//! The parallel-offset math itself is delegated to the geometry engine;
//! this module owns orchestration: signed radius and cut-direction
//! selection, pocket-clearing recursion, overcut corner relief, the
//! small-circle drill-point fallback, and raw pass-through for open or
//! unoffsettable geometry.
//!
//! Engine sign convention (verified by the engine's own test suite): a
//! positive offset displaces the curve to the left of the direction of
//! travel, i.e. inward for a counter-clockwise closed polyline.

use cavalier_contours::polyline::{
    PlineOffsetOptions, PlineSource, PlineSourceMut, PlineVertex, Polyline,
};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, warn};
use vectorcam_core::{edge_length, CamObject, Point, Segment, Setup, ToolOffsetSide};

use crate::containment::is_inside_polygon;

/// Pocket-clearing stepover as a fraction of the tool radius.
const POCKET_STEP_FACTOR: f64 = 1.2;

/// Minimum interior turn treated as a sharp corner by the overcut pass.
const OVERCUT_MIN_TURN: f64 = std::f64::consts::FRAC_PI_4;

/// Hard bound on pocket-clearing iterations for pathological geometry.
const POCKET_QUEUE_LIMIT: usize = 10_000;

/// One tool-radius-compensated curve ready for sequencing and staging.
#[derive(Debug, Clone)]
pub struct OffsetCurve {
    /// Map key: `"{object_id}.{n}"`, or `"{object_id}.{n}.x"` for a
    /// synthesized drill point.
    pub key: String,
    pub polyline: Polyline<f64>,
    pub obj_id: usize,
    /// Nesting depth of the source object; the sequencer cuts levels from
    /// the maximum down to zero.
    pub level: usize,
    pub tool_offset: ToolOffsetSide,
    /// Offset magnitude actually applied by the engine, in mm. Zero for raw
    /// pass-through curves. The staging metadata reports this value, not a
    /// tool-derived one, so overrides stay visible.
    pub offset_radius: f64,
    /// True for interior pocket-clearing passes.
    pub is_pocket: bool,
    pub layer: String,
    pub setup: Setup,
}

impl OffsetCurve {
    pub fn is_closed(&self) -> bool {
        self.polyline.is_closed()
    }

    pub fn vertex_count(&self) -> usize {
        self.polyline.vertex_data.len()
    }

    pub fn point_at(&self, index: usize) -> Point {
        let v = &self.polyline.vertex_data[index];
        Point::new(v.x, v.y)
    }

    /// Total traversal length in mm, arcs included.
    pub fn path_length(&self) -> f64 {
        let vd = &self.polyline.vertex_data;
        let n = vd.len();
        if n < 2 {
            return 0.0;
        }
        let edges = if self.is_closed() { n } else { n - 1 };
        (0..edges)
            .map(|i| {
                let a = &vd[i];
                let b = &vd[(i + 1) % n];
                edge_length(Point::new(a.x, a.y), Point::new(b.x, b.y), a.bulge)
            })
            .sum()
    }
}

/// Converts a chained segment list into an engine polyline. Closed chains
/// rely on the implicit wraparound; open chains get an explicit final
/// vertex.
fn segments_to_polyline(segments: &[Segment], closed: bool) -> Polyline<f64> {
    let mut pline = Polyline::new();
    pline.set_is_closed(closed);
    for seg in segments {
        pline.add_vertex(PlineVertex::new(seg.start.x, seg.start.y, seg.bulge));
    }
    if !closed {
        if let Some(last) = segments.last() {
            pline.add_vertex(PlineVertex::new(last.end.x, last.end.y, 0.0));
        }
    }
    pline
}

/// Invokes the engine with self-intersection handling enabled. An empty
/// result means the feature is too small for the requested offset.
fn engine_offset(pline: &Polyline<f64>, offset: f64) -> Vec<Polyline<f64>> {
    let mut options = PlineOffsetOptions::new();
    options.handle_self_intersects = true;
    pline.parallel_offset_opt(offset, &options)
}

fn reversed_segments(segments: &[Segment]) -> Vec<Segment> {
    segments.iter().rev().map(|s| s.reversed()).collect()
}

/// Ray/segment intersection distance, treating bulged segments as chords.
fn ray_segment_distance(origin: Point, dir: (f64, f64), a: Point, b: Point) -> Option<f64> {
    let sx = b.x - a.x;
    let sy = b.y - a.y;
    let denom = dir.0 * sy - dir.1 * sx;
    if denom.abs() < 1e-12 {
        return None;
    }
    let qx = a.x - origin.x;
    let qy = a.y - origin.y;
    let t = (qx * sy - qy * sx) / denom;
    let u = (qx * dir.1 - qy * dir.0) / -denom;
    if t > 1e-9 && (-1e-9..=1.0 + 1e-9).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Distance from `origin` along `dir` to the nearest outline segment.
fn ray_outline_distance(outline: &[Segment], origin: Point, dir: (f64, f64)) -> Option<f64> {
    outline
        .iter()
        .filter_map(|seg| ray_segment_distance(origin, dir, seg.start, seg.end))
        .min_by(|a, b| a.total_cmp(b))
}

/// Inserts corner relief cuts at sharp straight-edge corners so no stock is
/// left where a round tool cannot reach. The relief runs along the corner
/// bisector, tool-radius past the original outline, capped at three radii.
fn overcut_corners(pline: &Polyline<f64>, obj: &CamObject, radius: f64) -> Polyline<f64> {
    let vd = &pline.vertex_data;
    let n = vd.len();
    if n < 3 {
        return pline.clone();
    }
    let radius = radius.abs();
    let mut out = Polyline::new();
    out.set_is_closed(pline.is_closed());

    for i in 0..n {
        let prev = &vd[(i + n - 1) % n];
        let cur = &vd[i];
        let next = &vd[(i + 1) % n];
        out.add_vertex(*cur);

        // Relief only applies between two straight edges.
        if prev.bulge != 0.0 || cur.bulge != 0.0 {
            continue;
        }
        let in_len = ((cur.x - prev.x).powi(2) + (cur.y - prev.y).powi(2)).sqrt();
        let out_len = ((next.x - cur.x).powi(2) + (next.y - cur.y).powi(2)).sqrt();
        if in_len < 1e-9 || out_len < 1e-9 {
            continue;
        }
        let vin = ((cur.x - prev.x) / in_len, (cur.y - prev.y) / in_len);
        let vout = ((next.x - cur.x) / out_len, (next.y - cur.y) / out_len);
        let dot = (vin.0 * vout.0 + vin.1 * vout.1).clamp(-1.0, 1.0);
        let turn = dot.acos();
        if turn < OVERCUT_MIN_TURN {
            continue;
        }

        // Bisector pointing into the corner of the original outline.
        let bx = vin.0 - vout.0;
        let by = vin.1 - vout.1;
        let blen = (bx * bx + by * by).sqrt();
        if blen < 1e-9 {
            continue;
        }
        let dir = (bx / blen, by / blen);
        let corner = Point::new(cur.x, cur.y);
        let max_len = 3.0 * radius;
        let len = match ray_outline_distance(&obj.segments, corner, dir) {
            Some(d) => (d + radius).min(max_len),
            None => max_len,
        };
        let relief = PlineVertex::new(corner.x + dir.0 * len, corner.y + dir.1 * len, 0.0);
        out.add_vertex(relief);
        out.add_vertex(PlineVertex::new(corner.x, corner.y, 0.0));
    }
    out
}

fn make_curve(
    key: String,
    polyline: Polyline<f64>,
    obj: &CamObject,
    level: usize,
    offset_radius: f64,
    is_pocket: bool,
) -> OffsetCurve {
    OffsetCurve {
        key,
        polyline,
        obj_id: obj.id,
        level,
        tool_offset: obj.tool_offset,
        offset_radius,
        is_pocket,
        layer: obj.layer.clone(),
        setup: obj.setup.clone(),
    }
}

/// Raw, unoffset pass-through: the object geometry itself at the lowest
/// priority level. Used for open paths, `none` offset sides, and closed
/// objects the engine could not offset.
fn raw_fallback(obj: &CamObject, seq: usize, max_outer: usize) -> OffsetCurve {
    let polyline = segments_to_polyline(&obj.segments, obj.closed);
    make_curve(
        format!("{}.{}", obj.id, seq),
        polyline,
        obj,
        max_outer,
        0.0,
        false,
    )
}

/// Clears the interior of an inside-offset object: every resulting closed
/// curve is re-offset inward by 1.2 tool radii until the engine yields
/// nothing. Results whose first vertex falls outside the original polygon
/// are discarded (the engine can return exterior loops when the input had a
/// hole of its own). Explicit work queue, no recursion.
fn clear_pocket(
    obj: &CamObject,
    profile_curves: &[Polyline<f64>],
    signed_radius: f64,
    curves: &mut Vec<OffsetCurve>,
) {
    let step = POCKET_STEP_FACTOR * signed_radius;
    let mut queue: VecDeque<Polyline<f64>> = profile_curves
        .iter()
        .filter(|p| p.is_closed())
        .cloned()
        .collect();
    let mut seq = 0usize;
    let mut iterations = 0usize;

    while let Some(pline) = queue.pop_front() {
        iterations += 1;
        if iterations > POCKET_QUEUE_LIMIT {
            warn!(object = obj.id, "pocket clearing hit iteration limit");
            break;
        }
        for child in engine_offset(&pline, step) {
            let Some(first) = child.vertex_data.first() else {
                continue;
            };
            if !is_inside_polygon(&obj.segments, Point::new(first.x, first.y)) {
                continue;
            }
            let key = format!("{}.p{}", obj.id, seq);
            seq += 1;
            curves.push(make_curve(
                key,
                child.clone(),
                obj,
                obj.level(),
                signed_radius.abs(),
                true,
            ));
            queue.push_back(child);
        }
    }
}

/// Computes tool-radius-compensated offset curves for every active object.
///
/// The signed radius is half the tool diameter (or the object's explicit
/// override), negated by `mill.reverse`. The cut direction is flipped when
/// exactly one of "inside offset" or "reverse" applies, keeping the
/// compensation side consistent with climb/conventional intent. Per-object
/// engine failures degrade to the raw fallback rather than aborting.
pub fn compute_offsets(
    tool_diameter: f64,
    objects: &BTreeMap<usize, CamObject>,
    max_outer: usize,
    small_circles: bool,
) -> Vec<OffsetCurve> {
    let mut curves = Vec::new();

    for obj in objects.values() {
        if !obj.setup.mill.active {
            continue;
        }
        if obj.segments.is_empty() {
            continue;
        }

        if !obj.closed || obj.tool_offset == ToolOffsetSide::None {
            curves.push(raw_fallback(obj, 0, max_outer));
            continue;
        }

        let base_radius = obj.overwrite_offset.unwrap_or(tool_diameter / 2.0);
        let reverse = obj.setup.mill.reverse;
        let signed_radius = if reverse { -base_radius } else { base_radius };
        let flip = (obj.tool_offset == ToolOffsetSide::Inside) != reverse;

        let source = if flip {
            segments_to_polyline(&reversed_segments(&obj.segments), true)
        } else {
            segments_to_polyline(&obj.segments, true)
        };

        let results = engine_offset(&source, signed_radius);
        if results.is_empty() {
            if small_circles || obj.setup.mill.small_circles {
                if let Some(center) = obj.circle_center() {
                    // Tool larger than the hole: emit a drill-point marker
                    // at the circle center instead.
                    let mut point = Polyline::new();
                    point.add_vertex(PlineVertex::new(center.x, center.y, 0.0));
                    debug!(object = obj.id, "small circle reduced to drill point");
                    curves.push(make_curve(
                        format!("{}.0.x", obj.id),
                        point,
                        obj,
                        obj.level(),
                        base_radius,
                        false,
                    ));
                    continue;
                }
            }
            warn!(
                object = obj.id,
                radius = signed_radius,
                "offset engine returned no result, falling back to raw geometry"
            );
            curves.push(raw_fallback(obj, 0, max_outer));
            continue;
        }

        let overcut = obj.setup.mill.overcut;
        for (n, pline) in results.iter().enumerate() {
            let profile = if overcut {
                overcut_corners(pline, obj, base_radius)
            } else {
                pline.clone()
            };
            curves.push(make_curve(
                format!("{}.{}", obj.id, n),
                profile,
                obj,
                obj.level(),
                base_radius,
                false,
            ));
        }

        if obj.tool_offset == ToolOffsetSide::Inside && obj.setup.pockets.active {
            clear_pocket(obj, &results, signed_radius, &mut curves);
        }
    }

    debug!(curves = curves.len(), "offset computation done");
    curves
}
