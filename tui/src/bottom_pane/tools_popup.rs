use std::time::Instant;

use banter_protocol::commands::Command;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::WidgetRef;

use super::pointer_debounce::PointerDebounce;
use super::popup_consts::MAX_POPUP_ROWS;
use super::scroll_state::ScrollState;
use super::selection_popup_common;
use super::selection_popup_common::GenericDisplayRow;
use super::selection_popup_common::render_rows;

/// Whether the Tools trigger should be rendered at all: it needs at
/// least one non-button command behind it.
pub(crate) fn trigger_visible(commands: &[Command]) -> bool {
    commands.iter().any(|command| !command.button)
}

/// The popover opened from the Tools trigger, listing every non-button
/// command. Unlike the inline menu it has no filter; it exists only
/// while open, so constructing one is the "open" transition and resets
/// the highlight to the first row.
pub(crate) struct ToolsPopup {
    commands: Vec<Command>,
    state: ScrollState,
    pointer: PointerDebounce,
}

impl ToolsPopup {
    /// Open the popover over the non-button subset of `commands`.
    /// Returns `None` when there is nothing to show (empty registry, or
    /// every command is button-flagged).
    pub(crate) fn new(commands: &[Command]) -> Option<Self> {
        let non_button: Vec<Command> = commands
            .iter()
            .filter(|command| !command.button)
            .cloned()
            .collect();
        if non_button.is_empty() {
            return None;
        }
        let mut state = ScrollState::new();
        state.reset_to_first(non_button.len());
        Some(Self {
            commands: non_button,
            state,
            pointer: PointerDebounce::default(),
        })
    }

    pub(crate) fn calculate_required_height(&self) -> u16 {
        self.commands.len().clamp(1, MAX_POPUP_ROWS) as u16
    }

    pub(crate) fn move_up(&mut self, now: Instant) {
        if !self.pointer.keyboard_active(now) {
            return;
        }
        self.state.move_up_wrap(self.commands.len());
        self.ensure_visible();
    }

    pub(crate) fn move_down(&mut self, now: Instant) {
        if !self.pointer.keyboard_active(now) {
            return;
        }
        self.state.move_down_wrap(self.commands.len());
        self.ensure_visible();
    }

    pub(crate) fn on_pointer_move(&mut self, idx: usize, now: Instant) {
        if idx >= self.commands.len() || !self.pointer.accept_pointer_move(now) {
            return;
        }
        self.state.selected_idx = Some(idx);
        self.ensure_visible();
    }

    pub(crate) fn on_pointer_leave(&mut self, now: Instant) {
        self.pointer.note_pointer_leave(now);
    }

    pub(crate) fn set_highlight(&mut self, idx: usize) {
        if idx < self.commands.len() {
            self.state.selected_idx = Some(idx);
        }
    }

    pub(crate) fn selected_command(&self) -> Option<&Command> {
        self.state.selected_idx.and_then(|idx| self.commands.get(idx))
    }

    pub(crate) fn highlighted_idx(&self) -> Option<usize> {
        self.state.selected_idx
    }

    pub(crate) fn hit_test_row(&self, area: Rect, x: u16, y: u16) -> Option<usize> {
        selection_popup_common::hit_test_row(area, &self.state, self.commands.len(), x, y)
    }

    fn ensure_visible(&mut self) {
        let len = self.commands.len();
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }

    fn rows(&self) -> Vec<GenericDisplayRow> {
        self.commands
            .iter()
            .map(|command| GenericDisplayRow {
                name: command.id.clone(),
                icon: (!command.icon.is_empty()).then(|| command.icon.clone()),
                description: Some(command.description.clone()),
            })
            .collect()
    }
}

impl WidgetRef for ToolsPopup {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        render_rows(
            area,
            buf,
            &self.rows(),
            &self.state,
            MAX_POPUP_ROWS,
            "no tools",
        );
    }
}
