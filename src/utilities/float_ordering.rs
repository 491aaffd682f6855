//! Order-preserving integer encodings of floats.
//!
//! The sweep along the primary axis compares X bounds on every candidate, so
//! those bounds are stored pre-encoded as signed integers and the hot
//! compares run in the integer pipeline.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    __m128, __m128i, _mm_add_ps, _mm_and_si128, _mm_castps_si128, _mm_set1_epi32, _mm_setzero_ps,
    _mm_srai_epi32, _mm_xor_si128,
};

/// Maps a float to a signed integer that sorts the same way the float does.
///
/// Non-negative floats keep their bit pattern; negative floats get every bit
/// below the sign flipped, which reverses their (descending) raw-bit order.
/// Both zeros map to the same encoding. NaN inputs produce a valid integer
/// with no ordering guarantee.
#[inline(always)]
pub fn encode_float(value: f32) -> i32 {
    // Adding zero is not a no-op: IEEE 754 defines -0.0 + 0.0 == +0.0, which
    // collapses the two zero encodings. The black_box keeps the addition
    // from being folded away.
    let canonical = value + std::hint::black_box(0.0f32);
    let bits = canonical.to_bits() as i32;
    bits ^ ((bits >> 31) & 0x7fff_ffff)
}

/// Unsigned form of [`encode_float`] whose plain `u32` order matches the
/// float order. Radix sort keys use this form.
#[inline(always)]
pub fn sortable_bits(value: f32) -> u32 {
    (encode_float(value) as u32) ^ 0x8000_0000
}

/// Four-lane variant of [`encode_float`] for the batch box layout path.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub unsafe fn encode_lanes(values: __m128) -> __m128i {
    let canonical = _mm_add_ps(values, _mm_setzero_ps());
    let sign = _mm_srai_epi32(_mm_castps_si128(canonical), 31);
    let toggle = _mm_and_si128(sign, _mm_set1_epi32(0x7fff_ffff));
    _mm_xor_si128(_mm_castps_si128(canonical), toggle)
}
