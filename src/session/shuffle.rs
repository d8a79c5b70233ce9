use rand::Rng;
use rand::seq::SliceRandom;

use super::queue::Slot;

/// Shuffle `slots` in place with an unbiased Fisher–Yates pass.
///
/// When `pinned` names a valid index, that slot is moved to the front first
/// and only the remaining slots are permuted.
pub(super) fn shuffle_pinned<R: Rng + ?Sized>(slots: &mut [Slot], pinned: Option<usize>, rng: &mut R) {
    match pinned {
        Some(p) if p < slots.len() => {
            slots[..=p].rotate_right(1);
            slots[1..].shuffle(rng);
        }
        _ => slots.shuffle(rng),
    }
}
