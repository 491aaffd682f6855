//! Insertion sort for keys with attached rank values.
//!
//! Quadratic, but with no setup cost at all; it beats the radix passes on
//! small inputs and on nearly sorted data.

/// Sorts keys and their values in place. The sort is stable.
#[inline(always)]
pub fn sort(keys: &mut [u32], values: &mut [u32]) {
    debug_assert!(
        values.len() >= keys.len(),
        "Every key needs a matching value slot."
    );
    for i in 1..keys.len() {
        unsafe {
            let original_key = *keys.get_unchecked(i);
            let original_value = *values.get_unchecked(i);
            let mut compare_index = i;

            while compare_index > 0 && *keys.get_unchecked(compare_index - 1) > original_key {
                // Shift elements up.
                *keys.get_unchecked_mut(compare_index) = *keys.get_unchecked(compare_index - 1);
                *values.get_unchecked_mut(compare_index) =
                    *values.get_unchecked(compare_index - 1);
                compare_index -= 1;
            }

            *keys.get_unchecked_mut(compare_index) = original_key;
            *values.get_unchecked_mut(compare_index) = original_value;
        }
    }
}
