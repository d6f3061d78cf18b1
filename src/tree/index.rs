use crate::tree::{Key, NodeIndex};

/// Maps a positional hash to its home slot in a table of `capacity` slots.
///
/// Both 32-bit halves of the hash are folded together before masking so that
/// the entropy of the high bits is not lost for small tables. `capacity` has to
/// be a power of two.
#[must_use]
#[inline]
pub fn hash_to_index(key: Key, capacity: usize) -> NodeIndex {
    debug_assert!(capacity.is_power_of_two());
    let folded = (key ^ (key >> 32)) & 0xFFFF_FFFF;
    (folded as usize) & (capacity - 1)
}
