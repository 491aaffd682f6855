//! Sorting primitives backing the primary-axis sort.

pub mod insertion_sort;
pub mod radix_sort;
