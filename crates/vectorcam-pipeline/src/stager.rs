//! Depth staging: expands a sequenced 2D curve into multi-pass 3D moves.
//!
//! Each curve is cut in repeated full-profile passes at `step` increments
//! until the configured depth, with the final pass clamped to land exactly
//! on it. Helix mode replaces the first plunge with a continuous Z ramp
//! along the profile. Closed curves re-cut without retracting (the tool is
//! already back at the start vertex); open curves retract to `fast_move_z`
//! and re-approach between passes.

use tracing::debug;
use vectorcam_core::{bulge_to_arc, edge_length, Point};

use crate::machine::CommandStream;
use crate::offset::OffsetCurve;

struct Edge {
    from: Point,
    to: Point,
    bulge: f64,
    /// Accumulated traversal length up to and including this edge.
    cum_length: f64,
}

fn curve_edges(curve: &OffsetCurve) -> Vec<Edge> {
    let vd = &curve.polyline.vertex_data;
    let n = vd.len();
    if n < 2 {
        return Vec::new();
    }
    let count = if curve.is_closed() { n } else { n - 1 };
    let mut cum = 0.0;
    (0..count)
        .map(|i| {
            let a = &vd[i];
            let b = &vd[(i + 1) % n];
            let from = Point::new(a.x, a.y);
            let to = Point::new(b.x, b.y);
            cum += edge_length(from, to, a.bulge);
            Edge {
                from,
                to,
                bulge: a.bulge,
                cum_length: cum,
            }
        })
        .collect()
}

enum PassZ {
    /// Constant Z for the whole pass.
    Flat(f64),
    /// Z interpolated along accumulated path length (helix entry).
    Ramp { from: f64, to: f64, total: f64 },
}

fn emit_pass(stream: &mut CommandStream, edges: &[Edge], mode: &PassZ) {
    for edge in edges {
        let z = match mode {
            PassZ::Flat(depth) => *depth,
            PassZ::Ramp { from, to, total } => {
                if *total > 0.0 {
                    from + (to - from) * (edge.cum_length / total)
                } else {
                    *to
                }
            }
        };
        if edge.bulge == 0.0 {
            if edge.from.distance_to(&edge.to) < 1e-12 {
                continue;
            }
            stream.linear_move(edge.to.x, edge.to.y, z);
        } else {
            match bulge_to_arc(edge.from, edge.to, edge.bulge) {
                Some(arc) => {
                    let i = arc.center.x - edge.from.x;
                    let j = arc.center.y - edge.from.y;
                    if edge.bulge > 0.0 {
                        stream.arc_ccw(edge.to.x, edge.to.y, z, i, j);
                    } else {
                        stream.arc_cw(edge.to.x, edge.to.y, z, i, j);
                    }
                }
                None => stream.linear_move(edge.to.x, edge.to.y, z),
            }
        }
    }
}

/// Stages one sequenced curve into the command stream: metadata comments, a
/// rapid approach, then depth passes down to the configured target.
pub fn stage_curve(curve: &OffsetCurve, order: usize, stream: &mut CommandStream) {
    let vd = &curve.polyline.vertex_data;
    let Some(first) = vd.first() else {
        return;
    };
    let mill = &curve.setup.mill;
    let target = mill.sanitized_depth();
    let step = mill.sanitized_step();
    let fast_z = mill.fast_move_z;
    let closed = curve.is_closed();
    let start = Point::new(first.x, first.y);
    let edges = curve_edges(curve);

    stream.comment(format!(
        "cut {}: object {} ({}) level {} layer {}",
        order, curve.obj_id, curve.key, curve.level, curve.layer
    ));
    stream.comment(format!(
        "closed: {} pocket: {} length: {:.3}mm",
        closed,
        curve.is_pocket,
        curve.path_length()
    ));
    stream.comment(format!(
        "depth: 0.000 to {:.3}mm step {:.3}mm",
        target, step
    ));
    stream.comment(format!(
        "tool {} offset: {} {:.3}mm",
        curve.setup.tool.number, curve.tool_offset, curve.offset_radius
    ));

    stream.rapid_move(start.x, start.y, fast_z);

    let mut depth = step;
    let mut helix = mill.helix_mode && closed && !edges.is_empty();
    let mut last_depth = 0.0;
    let total_length = edges.last().map(|e| e.cum_length).unwrap_or(0.0);

    loop {
        if depth < target {
            depth = target;
        }
        if helix {
            // Engage at the previous depth, then ramp the whole profile
            // down to the current one. The following flat pass at the same
            // depth levels the ramp out.
            stream.linear_move(start.x, start.y, last_depth);
            emit_pass(
                stream,
                &edges,
                &PassZ::Ramp {
                    from: last_depth,
                    to: depth,
                    total: total_length,
                },
            );
            helix = false;
            last_depth = depth;
            continue;
        }

        let pos = stream.position();
        stream.linear_move(pos.x, pos.y, depth);
        emit_pass(stream, &edges, &PassZ::Flat(depth));
        last_depth = depth;

        if depth <= target + 1e-9 {
            break;
        }
        depth += step;

        if !closed {
            let pos = stream.position();
            stream.rapid_move(pos.x, pos.y, fast_z);
            stream.rapid_move(start.x, start.y, fast_z);
        }
    }

    let pos = stream.position();
    stream.rapid_move(pos.x, pos.y, fast_z);
    debug!(key = %curve.key, order, "curve staged");
}
