//! LSB (least significant byte) radix sort for unsigned keys with ranks.

const BUCKET_COUNT: usize = 256;

/// Reorders keys and values based on a single byte of the key.
#[inline(always)]
unsafe fn reorder_for_byte(
    source_keys: *const u32,
    target_keys: *mut u32,
    source_values: *const u32,
    target_values: *mut u32,
    key_count: usize,
    offsets: *mut u32,
    shift: u32,
) {
    for i in 0..key_count {
        let key = *source_keys.add(i);
        let bucket_start = offsets.add(((key >> shift) & 0xFF) as usize);
        let target_index = *bucket_start as usize;
        *target_keys.add(target_index) = key;
        *target_values.add(target_index) = *source_values.add(i);
        *bucket_start += 1;
    }
}

/// Sorts keys and their values using a four-pass byte radix sort.
///
/// All byte positions are counted in one pass over the keys, then the four
/// reorder passes ping-pong between the primary and scratch buffers. Four is
/// even, so the sorted data lands back in `keys` and `values`. The sort is
/// stable.
pub fn sort(
    keys: &mut [u32],
    values: &mut [u32],
    keys_scratch: &mut [u32],
    values_scratch: &mut [u32],
) {
    let key_count = keys.len();
    debug_assert!(
        values.len() >= key_count
            && keys_scratch.len() >= key_count
            && values_scratch.len() >= key_count,
        "The buffers must be able to hold the sort region."
    );

    let mut bucket_counts = [0u32; BUCKET_COUNT * 4];
    for &key in keys.iter() {
        bucket_counts[(key & 0xFF) as usize] += 1;
        bucket_counts[BUCKET_COUNT + ((key >> 8) & 0xFF) as usize] += 1;
        bucket_counts[2 * BUCKET_COUNT + ((key >> 16) & 0xFF) as usize] += 1;
        bucket_counts[3 * BUCKET_COUNT + (key >> 24) as usize] += 1;
    }

    // Convert bucket counts to bucket start offsets.
    let mut sums = [0u32; 4];
    for i in 0..BUCKET_COUNT {
        for (pass, sum) in sums.iter_mut().enumerate() {
            let slot = &mut bucket_counts[pass * BUCKET_COUNT + i];
            let count = *slot;
            *slot = *sum;
            *sum += count;
        }
    }

    unsafe {
        let primary_keys = keys.as_mut_ptr();
        let primary_values = values.as_mut_ptr();
        let scratch_keys = keys_scratch.as_mut_ptr();
        let scratch_values = values_scratch.as_mut_ptr();
        let offsets = bucket_counts.as_mut_ptr();

        reorder_for_byte(
            primary_keys,
            scratch_keys,
            primary_values,
            scratch_values,
            key_count,
            offsets,
            0,
        );
        reorder_for_byte(
            scratch_keys,
            primary_keys,
            scratch_values,
            primary_values,
            key_count,
            offsets.add(BUCKET_COUNT),
            8,
        );
        reorder_for_byte(
            primary_keys,
            scratch_keys,
            primary_values,
            scratch_values,
            key_count,
            offsets.add(2 * BUCKET_COUNT),
            16,
        );
        reorder_for_byte(
            scratch_keys,
            primary_keys,
            scratch_values,
            primary_values,
            key_count,
            offsets.add(3 * BUCKET_COUNT),
            24,
        );
    }
}
