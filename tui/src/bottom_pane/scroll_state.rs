/// Shared highlight/scroll bookkeeping for list popups.
///
/// `selected_idx` is `None` only while the list is empty; whenever rows
/// are visible it stays within `[0, len - 1]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScrollState {
    /// Currently highlighted row, if the list is non-empty.
    pub(crate) selected_idx: Option<usize>,
    /// First row currently scrolled into view.
    pub(crate) scroll_top: usize,
}

impl ScrollState {
    pub(crate) fn new() -> Self {
        Self {
            selected_idx: None,
            scroll_top: 0,
        }
    }

    /// Reset the highlight to the first row (or none when empty).
    pub(crate) fn reset_to_first(&mut self, len: usize) {
        self.selected_idx = if len == 0 { None } else { Some(0) };
        self.scroll_top = 0;
    }

    /// Clamp the highlight into the bounds of a resized list.
    pub(crate) fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            self.scroll_top = 0;
        } else {
            self.selected_idx = Some(self.selected_idx.map_or(0, |idx| idx.min(len - 1)));
        }
    }

    /// Move the highlight one row up, wrapping to the last row from the top.
    pub(crate) fn move_up_wrap(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        });
    }

    /// Move the highlight one row down, wrapping to the first row from the end.
    pub(crate) fn move_down_wrap(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(idx) => (idx + 1) % len,
            None => 0,
        });
    }

    /// Scroll so the highlighted row sits inside the visible window.
    pub(crate) fn ensure_visible(&mut self, len: usize, visible: usize) {
        if len == 0 || visible == 0 {
            self.scroll_top = 0;
            return;
        }
        if let Some(sel) = self.selected_idx {
            if sel < self.scroll_top {
                self.scroll_top = sel;
            } else {
                let bottom = self.scroll_top + visible - 1;
                if sel > bottom {
                    self.scroll_top = sel + 1 - visible;
                }
            }
        }
        self.scroll_top = self.scroll_top.min(len.saturating_sub(visible));
    }
}
