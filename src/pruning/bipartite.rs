//! Bipartite box pruning between two disjoint sets.
//!
//! Two sweeps over the X-sorted sets: first-set anchors scan the second set
//! for candidates whose minimum X falls inside the anchor's X extent, then
//! the roles flip. The second sweep's running cursor skips candidates with
//! an equal minimum X, so a pair straddling the two sets reports exactly
//! once no matter which sweep reaches it.

use super::axis_sort::sorted_remap;
use crate::utilities::aabb::BoundingBox;
use crate::PruningError;
use log::debug;

#[inline(always)]
fn overlaps_yz(a: &BoundingBox, b: &BoundingBox) -> bool {
    b.max.y >= a.min.y && b.min.y <= a.max.y && b.max.z >= a.min.z && b.min.z <= a.max.z
}

/// Reports every overlapping pair `(i, j)` with box `i` in `first` and box
/// `j` in `second`. Touching boxes count as overlapping. Returns
/// [`PruningError::InvalidInput`] when either set is empty.
pub fn bipartite_box_pruning(
    first: &[BoundingBox],
    second: &[BoundingBox],
) -> Result<Vec<(u32, u32)>, PruningError> {
    if first.is_empty()
        || second.is_empty()
        || first.len() > u32::MAX as usize
        || second.len() > u32::MAX as usize
    {
        return Err(PruningError::InvalidInput);
    }

    let remap0 = sorted_remap(first, first.len());
    let remap1 = sorted_remap(second, second.len());
    let sorted0: Vec<BoundingBox> = remap0.iter().map(|&i| first[i as usize]).collect();
    let sorted1: Vec<BoundingBox> = remap1.iter().map(|&i| second[i as usize]).collect();

    let mut pairs: Vec<(u32, u32)> = Vec::new();

    // First-set anchors over second-set candidates.
    let mut running = 0usize;
    for (index0, box0) in sorted0.iter().enumerate() {
        let min_limit = box0.min.x;
        while running < sorted1.len() && sorted1[running].min.x < min_limit {
            running += 1;
        }
        if running >= sorted1.len() {
            break;
        }
        let id0 = remap0[index0];
        let max_limit = box0.max.x;
        for (candidate, box1) in sorted1.iter().enumerate().skip(running) {
            if box1.min.x > max_limit {
                break;
            }
            if overlaps_yz(box0, box1) {
                pairs.push((id0, remap1[candidate]));
            }
        }
    }

    // Second-set anchors over first-set candidates. The inclusive advance
    // compare leaves equal-minimum pairs to the first sweep.
    running = 0;
    for (index1, box1) in sorted1.iter().enumerate() {
        let min_limit = box1.min.x;
        while running < sorted0.len() && sorted0[running].min.x <= min_limit {
            running += 1;
        }
        if running >= sorted0.len() {
            break;
        }
        let id1 = remap1[index1];
        let max_limit = box1.max.x;
        for (candidate, box0) in sorted0.iter().enumerate().skip(running) {
            if box0.min.x > max_limit {
                break;
            }
            if overlaps_yz(box0, box1) {
                pairs.push((remap0[candidate], id1));
            }
        }
    }

    debug!(
        "bipartite pruning of {} x {} boxes reported {} pairs",
        first.len(),
        second.len(),
        pairs.len()
    );
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn aabb(min: (f32, f32, f32), max: (f32, f32, f32)) -> BoundingBox {
        BoundingBox::new(
            Vec3::new(min.0, min.1, min.2),
            Vec3::new(max.0, max.1, max.2),
        )
    }

    fn brute_force(first: &[BoundingBox], second: &[BoundingBox]) -> Vec<(u32, u32)> {
        let mut pairs = Vec::new();
        for (i, a) in first.iter().enumerate() {
            for (j, b) in second.iter().enumerate() {
                if a.intersects(b) {
                    pairs.push((i as u32, j as u32));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    fn sorted(mut pairs: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
        pairs.sort_unstable();
        pairs
    }

    fn random_boxes(count: usize, seed: u64) -> Vec<BoundingBox> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let min = Vec3::new(
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-20.0..20.0),
                );
                let diagonal = Vec3::new(
                    rng.gen_range(0.0..6.0),
                    rng.gen_range(0.0..6.0),
                    rng.gen_range(0.0..6.0),
                );
                BoundingBox::new(min, min + diagonal)
            })
            .collect()
    }

    #[test]
    fn test_empty_sets_are_invalid() {
        let boxes = [aabb((0.0, 0.0, 0.0), (1.0, 1.0, 1.0))];
        assert_eq!(
            bipartite_box_pruning(&[], &boxes).unwrap_err(),
            PruningError::InvalidInput
        );
        assert_eq!(
            bipartite_box_pruning(&boxes, &[]).unwrap_err(),
            PruningError::InvalidInput
        );
    }

    #[test]
    fn test_overlap_across_sets() {
        let first = [aabb((0.0, 0.0, 0.0), (2.0, 2.0, 2.0))];
        let second = [
            aabb((1.0, 1.0, 1.0), (3.0, 3.0, 3.0)),
            aabb((5.0, 5.0, 5.0), (6.0, 6.0, 6.0)),
        ];
        assert_eq!(
            sorted(bipartite_box_pruning(&first, &second).unwrap()),
            vec![(0, 0)]
        );
    }

    #[test]
    fn test_anchor_behind_candidate_still_reports() {
        // The overlap is only visible to the second sweep: the first-set box
        // starts after the second-set box does.
        let first = [aabb((1.0, 0.0, 0.0), (2.0, 1.0, 1.0))];
        let second = [aabb((0.0, 0.0, 0.0), (3.0, 1.0, 1.0))];
        assert_eq!(
            sorted(bipartite_box_pruning(&first, &second).unwrap()),
            vec![(0, 0)]
        );
    }

    #[test]
    fn test_equal_min_x_reports_once() {
        let first = [aabb((0.0, 0.0, 0.0), (1.0, 1.0, 1.0))];
        let second = [aabb((0.0, 0.0, 0.0), (1.0, 1.0, 1.0))];
        assert_eq!(
            bipartite_box_pruning(&first, &second).unwrap(),
            vec![(0, 0)]
        );
    }

    #[test]
    fn test_touching_faces_across_sets() {
        let first = [aabb((0.0, 0.0, 0.0), (1.0, 1.0, 1.0))];
        let second = [aabb((1.0, 0.0, 0.0), (2.0, 1.0, 1.0))];
        assert_eq!(
            sorted(bipartite_box_pruning(&first, &second).unwrap()),
            vec![(0, 0)]
        );
    }

    #[test]
    fn test_matches_brute_force() {
        for seed in 0..5 {
            let first = random_boxes(80, seed);
            let second = random_boxes(120, seed + 1000);
            assert_eq!(
                sorted(bipartite_box_pruning(&first, &second).unwrap()),
                brute_force(&first, &second),
                "seed {seed}"
            );
        }
    }
}
