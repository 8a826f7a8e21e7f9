//! Moves the current question index of an attempt.
//!
//! Every operation clamps to `[0, N-1]` instead of failing, works before and
//! after submission, and never touches the selections.

use crate::attempt::AttemptState;

/// Clamp `index` into a list of `len` questions. `len` is never zero for a
/// validated document; a zero length still yields 0.
#[must_use]
pub fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

/// Jump to `index`, clamped. Returns the new position.
pub fn go_to(attempt: &mut AttemptState, index: usize) -> usize {
    let index = clamp_index(index, attempt.question_count());
    attempt.set_current(index);
    index
}

/// Step forward one question, stopping at the last one.
pub fn next(attempt: &mut AttemptState) -> usize {
    let target = attempt.current_index().saturating_add(1);
    go_to(attempt, target)
}

/// Step back one question, stopping at the first one.
pub fn previous(attempt: &mut AttemptState) -> usize {
    let target = attempt.current_index().saturating_sub(1);
    go_to(attempt, target)
}

#[must_use]
pub fn is_first(attempt: &AttemptState) -> bool {
    attempt.current_index() == 0
}

#[must_use]
pub fn is_last(attempt: &AttemptState) -> bool {
    attempt.current_index() + 1 >= attempt.question_count()
}
