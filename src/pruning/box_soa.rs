//! Encoded structure-of-arrays box storage for the sweep kernel.
//!
//! One aligned slab holds six equally strided arrays, in memory order MaxX,
//! MinX (encoded integers), MaxY, MinY, MaxZ, MinZ (floats), all in sorted
//! box order. Rows past the real box count are sentinels that fail every
//! overlap test, which lets the kernel run full-width blocks without length
//! checks.

use crate::utilities::aabb::BoundingBox;
use crate::utilities::float_ordering::encode_float;
use crate::utilities::memory::AlignedBuffer;
use crate::PruningError;

#[cfg(target_arch = "x86_64")]
use crate::utilities::float_ordering::encode_lanes;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    __m128, __m128i, _mm_castsi128_ps, _mm_loadl_epi64, _mm_loadu_ps, _mm_movehl_ps,
    _mm_movelh_ps, _mm_store_ps, _mm_store_si128, _mm_unpackhi_ps, _mm_unpacklo_ps,
};

/// Alignment of the slab base pointer. The per-array stride is always a
/// multiple of this, so every array starts on the same alignment.
pub(crate) const SLAB_ALIGNMENT: usize = 32;

/// Rounds a box count up so every array holds a multiple of eight entries
/// with at least eight sentinel rows at the end.
#[inline(always)]
pub(crate) fn padded_box_count(count: usize) -> Result<usize, PruningError> {
    Ok(count.checked_add(15).ok_or(PruningError::AllocationFailure)? & !7usize)
}

pub(crate) struct BoxSoa {
    slab: AlignedBuffer,
    box_count: usize,
    padded_count: usize,
}

impl BoxSoa {
    /// Builds the six arrays from `boxes` in `remap` order and fills the
    /// padding rows with sentinels. Every element of the slab is written, so
    /// two builds from the same input produce identical bytes.
    pub fn build(boxes: &[BoundingBox], remap: &[u32]) -> Result<Self, PruningError> {
        debug_assert_eq!(std::mem::size_of::<BoundingBox>(), 24);
        debug_assert!(remap.len() >= boxes.len());

        let box_count = boxes.len();
        let padded_count = padded_box_count(box_count)?;
        let total_bytes = padded_count
            .checked_mul(4)
            .and_then(|stride| stride.checked_mul(6))
            .ok_or(PruningError::AllocationFailure)?;

        let slab = AlignedBuffer::allocate(total_bytes, SLAB_ALIGNMENT)?;
        let mut soa = Self {
            slab,
            box_count,
            padded_count,
        };
        unsafe {
            soa.scatter(boxes, remap);
            soa.fill_sentinels();
        }
        Ok(soa)
    }

    /// Number of real boxes stored.
    #[inline(always)]
    pub fn box_count(&self) -> usize {
        self.box_count
    }

    /// Number of rows in each array, sentinels included.
    #[inline(always)]
    pub fn padded_count(&self) -> usize {
        self.padded_count
    }

    /// Byte distance between two adjacent arrays in the slab.
    #[inline(always)]
    pub fn stride_bytes(&self) -> usize {
        self.padded_count * 4
    }

    #[inline(always)]
    fn array(&self, index: usize) -> *const u8 {
        debug_assert!(index < 6);
        unsafe { self.slab.as_ptr().add(index * self.stride_bytes()) }
    }

    #[inline(always)]
    fn array_mut(&mut self, index: usize) -> *mut u8 {
        debug_assert!(index < 6);
        let stride = self.stride_bytes();
        unsafe { self.slab.as_mut_ptr().add(index * stride) }
    }

    /// Encoded maximum X bounds; read only by the outer sweep.
    #[inline(always)]
    pub fn max_x(&self) -> *const i32 {
        self.array(0).cast()
    }

    /// Encoded minimum X bounds; both sweep cursors compare against these.
    #[inline(always)]
    pub fn min_x(&self) -> *const i32 {
        self.array(1).cast()
    }

    #[inline(always)]
    pub fn max_y(&self) -> *const f32 {
        self.array(2).cast()
    }

    #[inline(always)]
    pub fn min_y(&self) -> *const f32 {
        self.array(3).cast()
    }

    #[inline(always)]
    pub fn max_z(&self) -> *const f32 {
        self.array(4).cast()
    }

    #[inline(always)]
    pub fn min_z(&self) -> *const f32 {
        self.array(5).cast()
    }

    unsafe fn scatter(&mut self, boxes: &[BoundingBox], remap: &[u32]) {
        #[cfg(target_arch = "x86_64")]
        let mut index = self.scatter_blocks(boxes, remap);
        #[cfg(not(target_arch = "x86_64"))]
        let mut index = 0;

        let max_x = self.array_mut(0).cast::<i32>();
        let min_x = self.array_mut(1).cast::<i32>();
        let max_y = self.array_mut(2).cast::<f32>();
        let min_y = self.array_mut(3).cast::<f32>();
        let max_z = self.array_mut(4).cast::<f32>();
        let min_z = self.array_mut(5).cast::<f32>();
        while index < self.box_count {
            let b = &boxes[remap[index] as usize];
            *max_x.add(index) = encode_float(b.max.x);
            *min_x.add(index) = encode_float(b.min.x);
            *max_y.add(index) = b.max.y;
            *min_y.add(index) = b.min.y;
            *max_z.add(index) = b.max.z;
            *min_z.add(index) = b.min.z;
            index += 1;
        }
    }

    /// Lays out four boxes per iteration: two 4x4 transposes turn four
    /// row-major boxes into column vectors for each bound, the X columns get
    /// encoded, and each column is stored into its array.
    #[cfg(target_arch = "x86_64")]
    unsafe fn scatter_blocks(&mut self, boxes: &[BoundingBox], remap: &[u32]) -> usize {
        let block_end = self.box_count & !3usize;
        let max_x = self.array_mut(0).cast::<i32>();
        let min_x = self.array_mut(1).cast::<i32>();
        let max_y = self.array_mut(2).cast::<f32>();
        let min_y = self.array_mut(3).cast::<f32>();
        let max_z = self.array_mut(4).cast::<f32>();
        let min_z = self.array_mut(5).cast::<f32>();

        let mut index = 0;
        while index < block_end {
            let b0 = boxes.as_ptr().add(remap[index] as usize).cast::<f32>();
            let b1 = boxes.as_ptr().add(remap[index + 1] as usize).cast::<f32>();
            let b2 = boxes.as_ptr().add(remap[index + 2] as usize).cast::<f32>();
            let b3 = boxes.as_ptr().add(remap[index + 3] as usize).cast::<f32>();

            // (min.x, min.y, min.z, max.x) of each box.
            let (min_x_col, min_y_col, min_z_col, max_x_col) = transpose4(
                _mm_loadu_ps(b0),
                _mm_loadu_ps(b1),
                _mm_loadu_ps(b2),
                _mm_loadu_ps(b3),
            );
            _mm_store_si128(min_x.add(index).cast::<__m128i>(), encode_lanes(min_x_col));
            _mm_store_si128(max_x.add(index).cast::<__m128i>(), encode_lanes(max_x_col));
            _mm_store_ps(min_y.add(index), min_y_col);
            _mm_store_ps(min_z.add(index), min_z_col);

            // (max.y, max.z) of each box; the high transpose rows are junk.
            let (max_y_col, max_z_col, _, _) = transpose4(
                _mm_castsi128_ps(_mm_loadl_epi64(b0.add(4).cast::<__m128i>())),
                _mm_castsi128_ps(_mm_loadl_epi64(b1.add(4).cast::<__m128i>())),
                _mm_castsi128_ps(_mm_loadl_epi64(b2.add(4).cast::<__m128i>())),
                _mm_castsi128_ps(_mm_loadl_epi64(b3.add(4).cast::<__m128i>())),
            );
            _mm_store_ps(max_y.add(index), max_y_col);
            _mm_store_ps(max_z.add(index), max_z_col);

            index += 4;
        }
        block_end
    }

    unsafe fn fill_sentinels(&mut self) {
        let max_x = self.array_mut(0).cast::<i32>();
        let min_x = self.array_mut(1).cast::<i32>();
        let max_y = self.array_mut(2).cast::<f32>();
        let min_y = self.array_mut(3).cast::<f32>();
        let max_z = self.array_mut(4).cast::<f32>();
        let min_z = self.array_mut(5).cast::<f32>();
        for index in self.box_count..self.padded_count {
            *max_x.add(index) = i32::MIN;
            *min_x.add(index) = i32::MAX;
            *max_y.add(index) = f32::NEG_INFINITY;
            *min_y.add(index) = f32::INFINITY;
            *max_z.add(index) = f32::NEG_INFINITY;
            *min_z.add(index) = f32::INFINITY;
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn transpose4(r0: __m128, r1: __m128, r2: __m128, r3: __m128) -> (__m128, __m128, __m128, __m128) {
    let t0 = _mm_unpacklo_ps(r0, r1);
    let t1 = _mm_unpacklo_ps(r2, r3);
    let t2 = _mm_unpackhi_ps(r0, r1);
    let t3 = _mm_unpackhi_ps(r2, r3);
    (
        _mm_movelh_ps(t0, t1),
        _mm_movehl_ps(t1, t0),
        _mm_movelh_ps(t2, t3),
        _mm_movehl_ps(t3, t2),
    )
}
