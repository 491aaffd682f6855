//! Complete (single-set) box pruning.

use super::axis_sort::sorted_remap;
use super::box_soa::{padded_box_count, BoxSoa};
use super::pair_buffer::PairOutputBuffer;
use super::sweep::{detect_kernel_path, run_kernel};
use crate::utilities::aabb::BoundingBox;
use crate::PruningError;
use log::debug;

/// Reports every overlapping pair within `boxes`.
///
/// Pair entries are indices into `boxes`. Within a pair, the first entry is
/// the box whose sorted position along X comes first; callers that need a
/// canonical orientation or ordering can post-sort. Boxes that touch at a
/// face, edge, or corner count as overlapping. Each unordered pair appears
/// exactly once.
///
/// Returns [`PruningError::InvalidInput`] for an empty slice and
/// [`PruningError::AllocationFailure`] when working memory cannot be
/// obtained; no partial results are returned.
pub fn complete_box_pruning(boxes: &[BoundingBox]) -> Result<Vec<(u32, u32)>, PruningError> {
    if boxes.is_empty() || boxes.len() > u32::MAX as usize {
        return Err(PruningError::InvalidInput);
    }

    let padded = padded_box_count(boxes.len())?;
    let remap = sorted_remap(boxes, padded);
    let soa = BoxSoa::build(boxes, &remap)?;

    let mut storage: Vec<u32> = Vec::new();
    {
        let mut output = PairOutputBuffer::acquire(&mut storage)?;
        run_kernel(detect_kernel_path(), &soa, &remap, &mut output)?;
    }

    debug!(
        "complete pruning of {} boxes reported {} pairs",
        boxes.len(),
        storage.len() / 2
    );
    Ok(storage.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
}
