//! Minimal changed window between two unit sequences.

use crate::group::RenderUnit;
use std::ops::Range;

/// Differing windows of `old` and `new`, found by a prefix then suffix scan.
/// Identical sequences yield `0..0` for both.
///
/// Units compare by identity only. Moves are not detected: a unit that moved
/// lands inside the window.
pub fn diff(old: &[RenderUnit], new: &[RenderUnit]) -> (Range<usize>, Range<usize>) {
    let start = old
        .iter()
        .zip(new)
        .take_while(|(a, b)| a.same_as(b))
        .count();
    if start == old.len() && old.len() == new.len() {
        return (0..0, 0..0);
    }

    let mut old_end = old.len();
    let mut new_end = new.len();
    while old_end > start && new_end > start && old[old_end - 1].same_as(&new[new_end - 1]) {
        old_end -= 1;
        new_end -= 1;
    }
    (start..old_end, start..new_end)
}

/// Grows `range` by `by` on both sides, clamped to `0..len`.
pub(crate) fn widen(range: Range<usize>, by: usize, len: usize) -> Range<usize> {
    range.start.saturating_sub(by)..range.end.saturating_add(by).min(len)
}
