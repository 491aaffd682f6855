//! Vectorized sweep-and-prune broadphase over 3D axis-aligned bounding boxes.
//!
//! Given a set of boxes, [`complete_box_pruning`] reports every pair whose
//! boxes overlap on all three axes. Boxes are sorted along X once, laid out
//! as encoded structure-of-arrays data, and swept with a SIMD inner loop
//! that tests 4 or 8 candidates per iteration. [`bipartite_box_pruning`]
//! reports overlaps between two disjoint sets.
//!
//! The engine is one-shot: it holds no state between calls and performs no
//! incremental updates.

mod pruning;
mod utilities;

pub use pruning::{bipartite_box_pruning, complete_box_pruning};
pub use utilities::aabb::BoundingBox;

use thiserror::Error;

/// Failures surfaced by the pruning entry points.
///
/// There is no partial success: on error, any pairs found so far are
/// discarded along with the working buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PruningError {
    /// The input box set was empty, or its length does not fit the `u32`
    /// indices used in reported pairs.
    #[error("input box set is empty or too large to index")]
    InvalidInput,
    /// An allocation failed, or a buffer size computation overflowed.
    #[error("failed to allocate pruning working memory")]
    AllocationFailure,
}
