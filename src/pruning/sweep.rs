//! Sweep-and-prune kernel over the encoded box arrays.
//!
//! Boxes arrive sorted by encoded minimum X. For each anchor box the kernel
//! advances a persistent running cursor to the first candidate worth
//! testing, then walks forward in blocks of `LANES` candidates, testing Y
//! and Z overlap with vector compares while the candidates' minimum X stays
//! at or below the anchor's maximum X. A final masked block folds the X
//! range check into the overlap mask, so sentinel rows and candidates past
//! the anchor's extent never report.

use super::box_soa::BoxSoa;
use super::pair_buffer::PairOutputBuffer;
use super::simd::{ScalarLanes, SweepLanes};
use crate::PruningError;
use log::trace;

#[cfg(target_arch = "aarch64")]
use super::simd::NeonLanes;
#[cfg(target_arch = "x86_64")]
use super::simd::{AvxLanes, SseLanes};

/// Kernel implementations selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KernelPath {
    /// Eight candidates per iteration, aligned loads behind a masked prologue.
    Wide8,
    /// Four candidates per iteration, unaligned loads.
    Wide4,
    /// Portable lane emulation.
    Scalar,
}

/// Picks the widest kernel the host supports.
pub(crate) fn detect_kernel_path() -> KernelPath {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("popcnt") {
            return KernelPath::Wide8;
        }
        if is_x86_feature_detected!("ssse3") {
            return KernelPath::Wide4;
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            return KernelPath::Wide4;
        }
    }
    KernelPath::Scalar
}

/// Runs the sweep on the requested path, appending pairs of original box
/// indices to `output` in anchor-major, candidate-minor order.
pub(crate) fn run_kernel(
    path: KernelPath,
    soa: &BoxSoa,
    remap: &[u32],
    output: &mut PairOutputBuffer<'_>,
) -> Result<(), PruningError> {
    trace!("sweeping {} boxes on the {:?} kernel path", soa.box_count(), path);
    match path {
        #[cfg(target_arch = "x86_64")]
        KernelPath::Wide8 => unsafe { sweep_avx(soa, remap, output) },
        #[cfg(target_arch = "x86_64")]
        KernelPath::Wide4 => unsafe { sweep_sse(soa, remap, output) },
        #[cfg(target_arch = "aarch64")]
        KernelPath::Wide4 => unsafe { sweep_neon(soa, remap, output) },
        _ => unsafe { sweep::<ScalarLanes>(soa, remap, output) },
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,popcnt")]
unsafe fn sweep_avx(
    soa: &BoxSoa,
    remap: &[u32],
    output: &mut PairOutputBuffer<'_>,
) -> Result<(), PruningError> {
    sweep::<AvxLanes>(soa, remap, output)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
unsafe fn sweep_sse(
    soa: &BoxSoa,
    remap: &[u32],
    output: &mut PairOutputBuffer<'_>,
) -> Result<(), PruningError> {
    sweep::<SseLanes>(soa, remap, output)
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn sweep_neon(
    soa: &BoxSoa,
    remap: &[u32],
    output: &mut PairOutputBuffer<'_>,
) -> Result<(), PruningError> {
    sweep::<NeonLanes>(soa, remap, output)
}

/// The anchor's Y and Z bounds broadcast across all lanes.
struct AnchorLanes<L: SweepLanes> {
    max_y: L::Reals,
    min_y: L::Reals,
    max_z: L::Reals,
    min_z: L::Reals,
}

/// Closed-interval overlap on Y and Z: lane k is set when candidate k
/// touches or overlaps the anchor on both axes.
#[inline(always)]
unsafe fn yz_overlap<L: SweepLanes>(
    anchor: &AnchorLanes<L>,
    candidate_max_y: L::Reals,
    candidate_min_y: L::Reals,
    candidate_max_z: L::Reals,
    candidate_min_z: L::Reals,
) -> L::Mask {
    let mask = L::cmp_nlt(candidate_max_y, anchor.min_y);
    let mask = L::and(mask, L::cmp_le(candidate_min_y, anchor.max_y));
    let mask = L::and(mask, L::cmp_nlt(candidate_max_z, anchor.min_z));
    L::and(mask, L::cmp_le(candidate_min_z, anchor.max_z))
}

#[inline(always)]
unsafe fn load_body<L: SweepLanes>(source: *const f32) -> L::Reals {
    if L::ALIGNED_BODY {
        L::load_aligned(source)
    } else {
        L::load(source)
    }
}

/// Writes the pairs selected by `mask` for one block of candidates.
#[inline(always)]
unsafe fn report<L: SweepLanes>(
    output: &mut PairOutputBuffer<'_>,
    id0: u32,
    remap: *const u32,
    mask: u32,
) -> Result<(), PruningError> {
    output.ensure_room()?;
    L::pack_store(output.end(), id0, remap, mask);
    output.advance(2 * mask.count_ones() as usize);
    Ok(())
}

/// The width-generic sweep. Monomorphized per lanes implementation inside
/// the matching target-feature wrapper.
#[inline(always)]
unsafe fn sweep<L: SweepLanes>(
    soa: &BoxSoa,
    remap: &[u32],
    output: &mut PairOutputBuffer<'_>,
) -> Result<(), PruningError> {
    let box_count = soa.box_count();
    // Tail blocks read up to LANES - 1 rows past the last in-range
    // candidate; the padded rows of the arrays and of the remap keep those
    // reads in bounds.
    debug_assert!(soa.padded_count() >= box_count + L::LANES);
    debug_assert!(remap.len() >= soa.padded_count());

    let min_x = soa.min_x();
    let max_x = soa.max_x();
    let max_y = soa.max_y();
    let min_y = soa.min_y();
    let max_z = soa.max_z();
    let min_z = soa.min_z();
    let remap = remap.as_ptr();

    let mut running = 0usize;
    for index0 in 0..box_count {
        let min_limit = *min_x.add(index0);
        while *min_x.add(running) < min_limit {
            running += 1;
        }
        // Step past the stop position as well; in sorted order that is the
        // anchor's own slot, so the scan starts at its successor and no box
        // is ever tested against itself.
        running += 1;
        if running >= box_count {
            break;
        }

        // Clamped so a NaN-derived limit cannot match the MinX sentinel and
        // carry the scan into unowned memory.
        let max_limit = (*max_x.add(index0)).min(i32::MAX - 1);
        let id0 = *remap.add(index0);
        let anchor = AnchorLanes::<L> {
            max_y: L::splat(*max_y.add(index0)),
            min_y: L::splat(*min_y.add(index0)),
            max_z: L::splat(*max_z.add(index0)),
            min_z: L::splat(*min_z.add(index0)),
        };

        let mut index1 = running;
        if L::ALIGNED_BODY && *min_x.add(index1 + L::LANES - 1) <= max_limit {
            // One masked iteration gets subsequent loads onto an aligned
            // boundary. Lanes before the running cursor are cleared before
            // they can report.
            let lanes_before = index1 % L::LANES;
            let aligned = index1 - lanes_before;
            let hits = L::and(
                L::prefix_mask(lanes_before),
                yz_overlap::<L>(
                    &anchor,
                    L::load_aligned(max_y.add(aligned)),
                    L::load_aligned(min_y.add(aligned)),
                    L::load_aligned(max_z.add(aligned)),
                    L::load_aligned(min_z.add(aligned)),
                ),
            );
            let mask = L::move_mask(hits);
            if mask != 0 {
                report::<L>(output, id0, remap.add(aligned), mask)?;
            }
            index1 = aligned + L::LANES;
        }

        // Main body: every candidate in the block is within the anchor's X
        // range, so the mask is the YZ test alone.
        while *min_x.add(index1 + L::LANES - 1) <= max_limit {
            let hits = yz_overlap::<L>(
                &anchor,
                load_body::<L>(max_y.add(index1)),
                load_body::<L>(min_y.add(index1)),
                load_body::<L>(max_z.add(index1)),
                load_body::<L>(min_z.add(index1)),
            );
            let mask = L::move_mask(hits);
            if mask != 0 {
                report::<L>(output, id0, remap.add(index1), mask)?;
            }
            index1 += L::LANES;
        }

        // Tail block: the block straddles the anchor's X extent. Candidates
        // past it (and sentinel rows) are masked off with the integer
        // compare before the YZ result can report them.
        if *min_x.add(index1) <= max_limit {
            let hits = L::and_not(
                L::outside_limit(min_x.add(index1), max_limit),
                yz_overlap::<L>(
                    &anchor,
                    L::load(max_y.add(index1)),
                    L::load(min_y.add(index1)),
                    L::load(max_z.add(index1)),
                    L::load(min_z.add(index1)),
                ),
            );
            let mask = L::move_mask(hits);
            if mask != 0 {
                report::<L>(output, id0, remap.add(index1), mask)?;
            }
        }
    }
    Ok(())
}
