//! Toolpath sequencing: orders offset curves into one cut sequence.
//!
//! Levels are cut from the maximum nesting depth down to zero so inner
//! features are finished before the cut that frees the surrounding stock.
//! Within a level the next curve is the one with the nearest reachable
//! point from the current tool position; greedy, not globally optimal, but
//! it bounds rapid travel while strictly respecting the level ordering.

use cavalier_contours::polyline::{PlineVertex, Polyline};
use tracing::debug;
use vectorcam_core::Point;

use crate::offset::OffsetCurve;

/// Rotates a closed polyline's vertex list so `start` becomes index 0.
/// Bulges stay attached to their vertex, which keeps the bulge-to-edge
/// association intact under rotation.
fn rotate_closed(polyline: &mut Polyline<f64>, start: usize) {
    if start == 0 {
        return;
    }
    let vd = &mut polyline.vertex_data;
    vd.rotate_left(start);
}

/// Reverses an open polyline. The bulge array is negated and shifted by one
/// position so each edge keeps its curvature: edge `i` of the original
/// (bulge stored on vertex `i`) becomes edge `n-2-i` of the reversal.
fn reverse_open(polyline: &mut Polyline<f64>) {
    let vd = &polyline.vertex_data;
    let n = vd.len();
    let mut reversed = Vec::with_capacity(n);
    for j in 0..n {
        let src = &vd[n - 1 - j];
        let bulge = if j + 1 < n { -vd[n - 2 - j].bulge } else { 0.0 };
        reversed.push(PlineVertex::new(src.x, src.y, bulge));
    }
    polyline.vertex_data = reversed;
}

/// Nearest reachable vertex of a curve from `pos`: every vertex for closed
/// curves, only the two endpoints for open ones.
fn nearest_vertex(curve: &OffsetCurve, pos: Point) -> Option<(usize, f64)> {
    let n = curve.vertex_count();
    if n == 0 {
        return None;
    }
    let candidates: Vec<usize> = if curve.is_closed() {
        (0..n).collect()
    } else if n == 1 {
        vec![0]
    } else {
        vec![0, n - 1]
    };
    candidates
        .into_iter()
        .map(|i| (i, pos.distance_to(&curve.point_at(i))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Orders offset curves into a single cut sequence.
///
/// Iterates levels from `max_outer` down to 0; within a level repeatedly
/// picks the unvisited curve nearest the current tool position (starting at
/// the machine origin). Closed curves are rotated to start at the chosen
/// vertex; open curves entered at the far end are reversed. The tool
/// position advances to each curve's finishing point: the start vertex for
/// closed curves (cutting returns there), the far end for open ones.
pub fn sequence_curves(curves: Vec<OffsetCurve>, max_outer: usize) -> Vec<OffsetCurve> {
    let mut remaining = curves;
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut last_pos = Point::new(0.0, 0.0);

    for level in (0..=max_outer).rev() {
        loop {
            let mut best: Option<(usize, usize, f64)> = None;
            for (ci, curve) in remaining.iter().enumerate() {
                if curve.level != level {
                    continue;
                }
                if let Some((vi, dist)) = nearest_vertex(curve, last_pos) {
                    if best.map_or(true, |(_, _, d)| dist < d) {
                        best = Some((ci, vi, dist));
                    }
                }
            }
            let Some((ci, vi, _)) = best else {
                break;
            };
            let mut curve = remaining.swap_remove(ci);
            if curve.is_closed() {
                rotate_closed(&mut curve.polyline, vi);
                last_pos = curve.point_at(0);
            } else {
                if vi != 0 {
                    reverse_open(&mut curve.polyline);
                }
                last_pos = curve.point_at(curve.vertex_count() - 1);
            }
            ordered.push(curve);
        }
    }

    debug!(curves = ordered.len(), "sequencing done");
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavalier_contours::polyline::PlineSourceMut;
    use vectorcam_core::{Setup, ToolOffsetSide};

    fn closed_square(key: &str, level: usize, origin: f64) -> OffsetCurve {
        let mut pline = Polyline::new();
        pline.set_is_closed(true);
        for (x, y) in [
            (origin, origin),
            (origin + 10.0, origin),
            (origin + 10.0, origin + 10.0),
            (origin, origin + 10.0),
        ] {
            pline.add_vertex(PlineVertex::new(x, y, 0.0));
        }
        OffsetCurve {
            key: key.to_string(),
            polyline: pline,
            obj_id: 0,
            level,
            tool_offset: ToolOffsetSide::Outside,
            offset_radius: 2.0,
            is_pocket: false,
            layer: "0".to_string(),
            setup: Setup::default(),
        }
    }

    fn open_line(key: &str, level: usize, from: (f64, f64), to: (f64, f64)) -> OffsetCurve {
        let mut pline = Polyline::new();
        pline.add_vertex(PlineVertex::new(from.0, from.1, 0.5));
        pline.add_vertex(PlineVertex::new(to.0, to.1, 0.0));
        OffsetCurve {
            key: key.to_string(),
            polyline: pline,
            obj_id: 1,
            level,
            tool_offset: ToolOffsetSide::None,
            offset_radius: 0.0,
            is_pocket: false,
            layer: "0".to_string(),
            setup: Setup::default(),
        }
    }

    #[test]
    fn test_levels_strictly_descending() {
        let curves = vec![
            closed_square("a", 0, 0.0),
            closed_square("b", 2, 20.0),
            closed_square("c", 1, 40.0),
            closed_square("d", 2, 60.0),
        ];
        let ordered = sequence_curves(curves, 2);
        let levels: Vec<usize> = ordered.iter().map(|c| c.level).collect();
        for pair in levels.windows(2) {
            assert!(pair[0] >= pair[1], "level order violated: {levels:?}");
        }
        assert_eq!(ordered.len(), 4);
    }

    #[test]
    fn test_nearest_first_within_level() {
        let curves = vec![
            closed_square("far", 0, 100.0),
            closed_square("near", 0, 5.0),
        ];
        let ordered = sequence_curves(curves, 0);
        assert_eq!(ordered[0].key, "near");
        assert_eq!(ordered[1].key, "far");
    }

    #[test]
    fn test_closed_curve_rotated_to_nearest_vertex() {
        // Tool starts at origin; nearest vertex of this square is (20, 20).
        let mut curve = closed_square("a", 0, 20.0);
        curve.polyline.vertex_data.rotate_left(2);
        let ordered = sequence_curves(vec![curve], 0);
        let start = ordered[0].point_at(0);
        assert!((start.x - 20.0).abs() < 1e-12);
        assert!((start.y - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_open_curve_reversed_when_entered_at_far_end() {
        let curve = open_line("line", 0, (50.0, 0.0), (5.0, 0.0));
        let ordered = sequence_curves(vec![curve], 0);
        let c = &ordered[0];
        // Entered at (5, 0): point order reversed, bulge negated and
        // shifted onto the new first vertex.
        assert!((c.point_at(0).x - 5.0).abs() < 1e-12);
        assert!((c.point_at(1).x - 50.0).abs() < 1e-12);
        assert_eq!(c.polyline.vertex_data[0].bulge, -0.5);
        assert_eq!(c.polyline.vertex_data[1].bulge, 0.0);
    }

    #[test]
    fn test_last_pos_advances_to_open_curve_end() {
        let curves = vec![
            open_line("line", 0, (0.0, 0.0), (100.0, 0.0)),
            closed_square("near_line_start", 0, 1.0),
            closed_square("near_line_end", 0, 60.0),
        ];
        let ordered = sequence_curves(curves, 0);
        let keys: Vec<&str> = ordered.iter().map(|c| c.key.as_str()).collect();
        // The open line is cut first (its start sits on the origin) and
        // leaves the tool at x=100, so the square at 60 beats the one at 1.
        assert_eq!(keys, vec!["line", "near_line_end", "near_line_start"]);
    }
}
