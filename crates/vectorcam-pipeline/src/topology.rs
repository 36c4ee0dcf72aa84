//! Topology building: chains an unordered segment soup into objects.
//!
//! Greedy chain assembly with fuzzy endpoint matching. Each object claims a
//! seed segment, then repeatedly scans the unclaimed segments of its layer
//! for one whose start (append as-is) or end (append reversed) meets the
//! chain tail. When a scan pass appended reversed candidates but the chain
//! still cannot grow, the whole chain is reversed once and extension retried
//! from the new tail; this recovers chains that grew in the wrong direction.
//!
//! Closed objects are canonicalized to clockwise winding (interior on the
//! right of travel): a probe point 1.5 units to the left of the first
//! segment's midpoint must test outside. Downstream offset-side selection
//! depends on this fixed convention.
//!
//! Ambiguous matches (several candidates fuzzy-equal at 2 decimals) resolve
//! by scan order, first match wins; nondeterministic under degenerate
//! inputs but stable for a given input order.

use crate::containment::is_inside_polygon;
use std::collections::BTreeMap;
use tracing::debug;
use vectorcam_core::{face_probe, fuzzy_match, CamObject, Segment, Setup};

fn chain_is_closed(chain: &[Segment]) -> bool {
    match (chain.first(), chain.last()) {
        (Some(first), Some(last)) => fuzzy_match(first.start, last.end),
        _ => false,
    }
}

fn reverse_chain(chain: &mut Vec<Segment>) {
    chain.reverse();
    for seg in chain.iter_mut() {
        *seg = seg.reversed();
    }
}

/// Finds the next unclaimed segment of `layer` attachable to `tail`.
/// Returns the arena index and whether the candidate must be reversed.
fn find_extension(
    arena: &[Segment],
    tail: vectorcam_core::Point,
    layer: &str,
) -> Option<(usize, bool)> {
    for (idx, cand) in arena.iter().enumerate() {
        if cand.object.is_some() || cand.layer != layer {
            continue;
        }
        if fuzzy_match(tail, cand.start) {
            return Some((idx, false));
        }
        if fuzzy_match(tail, cand.end) {
            return Some((idx, true));
        }
    }
    None
}

/// Chains segments into objects, consuming ownership of every segment.
///
/// Every input segment ends up claimed by exactly one object (its `object`
/// field set to the owner's id). Objects get sequential ids in creation
/// order. Closed objects come out in canonical winding.
pub fn build_objects(
    segments: Vec<Segment>,
    default_setup: &Setup,
) -> BTreeMap<usize, CamObject> {
    let mut arena = segments;
    let mut objects = BTreeMap::new();
    let mut next_id = 0usize;

    while let Some(seed_idx) = arena.iter().position(|s| s.object.is_none()) {
        let id = next_id;
        next_id += 1;

        arena[seed_idx].object = Some(id);
        let layer = arena[seed_idx].layer.clone();
        let mut chain = vec![arena[seed_idx].clone()];

        loop {
            let mut reversals = 0usize;
            loop {
                let tail = chain.last().expect("chain starts with seed").end;
                match find_extension(&arena, tail, &layer) {
                    Some((idx, reversed)) => {
                        arena[idx].object = Some(id);
                        let seg = if reversed {
                            reversals += 1;
                            arena[idx].reversed()
                        } else {
                            arena[idx].clone()
                        };
                        chain.push(seg);
                    }
                    None => break,
                }
            }
            if chain_is_closed(&chain) {
                break;
            }
            if reversals > 0 {
                // The chain may have grown in the wrong direction; flip it
                // and retry extension from the other end.
                reverse_chain(&mut chain);
            } else {
                break;
            }
        }

        let closed = chain_is_closed(&chain);
        if closed {
            let first = &chain[0];
            let probe = face_probe(first.start, first.end, first.bulge);
            if is_inside_polygon(&chain, probe) {
                reverse_chain(&mut chain);
            }
        }

        for seg in &mut chain {
            seg.object = Some(id);
        }
        let obj = CamObject::new(id, chain, closed, default_setup.clone());
        objects.insert(id, obj);
    }

    debug!(objects = objects.len(), "topology built");
    objects
}
