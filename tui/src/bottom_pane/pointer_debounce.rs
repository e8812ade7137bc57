use std::time::Instant;

use super::popup_consts::KEYBOARD_AFTER_POINTER;
use super::popup_consts::POINTER_DEBOUNCE;

/// Arbitration between pointer-driven and keyboard-driven highlight
/// updates in a popup.
///
/// Terminal redraws can re-report the pointer over whatever row happens
/// to sit under a stationary cursor, so pointer highlight updates are
/// rate-limited; conversely, arrow keys are suppressed briefly after a
/// genuine pointer move so the highlight does not jump away from the
/// mouse. Callers pass `now` explicitly, which keeps the windows easy to
/// exercise in tests.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PointerDebounce {
    last_pointer_move: Option<Instant>,
}

impl PointerDebounce {
    /// Forget any recorded pointer activity, e.g. when a popup (re)opens
    /// or its row list changes.
    pub(crate) fn reset(&mut self) {
        self.last_pointer_move = None;
    }

    /// Record a pointer move; returns true when the highlight should
    /// follow it.
    pub(crate) fn accept_pointer_move(&mut self, now: Instant) -> bool {
        let accept = self
            .last_pointer_move
            .is_none_or(|at| now.duration_since(at) > POINTER_DEBOUNCE);
        if accept {
            self.last_pointer_move = Some(now);
        }
        accept
    }

    /// Pointer left the list: the last highlight stays, only the time is
    /// noted.
    pub(crate) fn note_pointer_leave(&mut self, now: Instant) {
        self.last_pointer_move = Some(now);
    }

    /// Whether arrow-key navigation is currently trusted.
    pub(crate) fn keyboard_active(&self, now: Instant) -> bool {
        self.last_pointer_move
            .is_none_or(|at| now.duration_since(at) > KEYBOARD_AFTER_POINTER)
    }
}
