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

/// Case-insensitive substring filter over command ids, ranked by the
/// position of the first match; ties keep registry order (the sort is
/// stable). An empty query returns the registry in its original order.
pub(crate) fn filter_commands<'a>(commands: &'a [Command], query: &str) -> Vec<&'a Command> {
    let query = query.to_lowercase();
    let mut matches: Vec<(usize, &Command)> = commands
        .iter()
        .filter_map(|command| {
            command
                .id
                .to_lowercase()
                .find(&query)
                .map(|at| (at, command))
        })
        .collect();
    matches.sort_by_key(|(at, _)| *at);
    matches.into_iter().map(|(_, command)| command).collect()
}

/// The inline autocomplete menu shown while the composer text is a
/// single `/`-prefixed token. Lists every registered command (button and
/// non-button alike), narrowed by the text typed after the slash.
pub(crate) struct CommandPopup {
    commands: Vec<Command>,
    command_filter: String,
    state: ScrollState,
    pointer: PointerDebounce,
    /// Ids visible after the last filter update, used to detect when a
    /// query edit changed the list.
    last_match_ids: Vec<String>,
}

impl CommandPopup {
    pub(crate) fn new(commands: Vec<Command>) -> Self {
        let last_match_ids = commands.iter().map(|c| c.id.clone()).collect();
        let mut state = ScrollState::new();
        state.reset_to_first(commands.len());
        Self {
            commands,
            command_filter: String::new(),
            state,
            pointer: PointerDebounce::default(),
            last_match_ids,
        }
    }

    /// Update the filter from the current composer text. The text is
    /// expected to start with a leading `/`; the first whitespace-free
    /// token after it becomes the active filter. The highlight resets to
    /// the first row whenever the match list changes shape.
    pub(crate) fn on_composer_text_change(&mut self, text: &str) {
        if let Some(stripped) = text.strip_prefix('/') {
            self.command_filter = stripped
                .split_whitespace()
                .next()
                .unwrap_or("")
                .to_string();
        } else {
            self.command_filter.clear();
        }

        let match_ids: Vec<String> = self.filtered().iter().map(|c| c.id.clone()).collect();
        let matches_len = match_ids.len();
        if match_ids != self.last_match_ids {
            self.state.reset_to_first(matches_len);
            self.pointer.reset();
            self.last_match_ids = match_ids;
        } else {
            self.state.clamp_selection(matches_len);
        }
        self.state
            .ensure_visible(matches_len, MAX_POPUP_ROWS.min(matches_len));
    }

    pub(crate) fn filtered(&self) -> Vec<&Command> {
        filter_commands(&self.commands, &self.command_filter)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.filtered().is_empty()
    }

    /// The token being completed, including the leading slash.
    pub(crate) fn filter_token(&self) -> String {
        format!("/{}", self.command_filter)
    }

    /// Preferred popup height in terminal rows.
    pub(crate) fn calculate_required_height(&self) -> u16 {
        self.filtered().len().clamp(1, MAX_POPUP_ROWS) as u16
    }

    /// Move the highlight one row up (wrapping), unless the pointer was
    /// active too recently.
    pub(crate) fn move_up(&mut self, now: Instant) {
        if !self.pointer.keyboard_active(now) {
            return;
        }
        let len = self.filtered().len();
        self.state.move_up_wrap(len);
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }

    /// Move the highlight one row down (wrapping), unless the pointer
    /// was active too recently.
    pub(crate) fn move_down(&mut self, now: Instant) {
        if !self.pointer.keyboard_active(now) {
            return;
        }
        let len = self.filtered().len();
        self.state.move_down_wrap(len);
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }

    /// Pointer moved over the row at `idx`; follows it when the move is
    /// genuine rather than a redraw artifact.
    pub(crate) fn on_pointer_move(&mut self, idx: usize, now: Instant) {
        let len = self.filtered().len();
        if idx >= len || !self.pointer.accept_pointer_move(now) {
            return;
        }
        self.state.selected_idx = Some(idx);
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }

    /// Pointer left the popup; the last highlighted row stays highlighted.
    pub(crate) fn on_pointer_leave(&mut self, now: Instant) {
        self.pointer.note_pointer_leave(now);
    }

    /// Force the highlight to `idx` (pointer click path).
    pub(crate) fn set_highlight(&mut self, idx: usize) {
        if idx < self.filtered().len() {
            self.state.selected_idx = Some(idx);
        }
    }

    pub(crate) fn selected_command(&self) -> Option<&Command> {
        let matches = self.filtered();
        self.state
            .selected_idx
            .and_then(|idx| matches.get(idx).copied())
    }

    pub(crate) fn highlighted_idx(&self) -> Option<usize> {
        self.state.selected_idx
    }

    /// Map a buffer position inside the popup area to a row index.
    pub(crate) fn hit_test_row(&self, area: Rect, x: u16, y: u16) -> Option<usize> {
        selection_popup_common::hit_test_row(area, &self.state, self.filtered().len(), x, y)
    }

    fn rows(&self) -> Vec<GenericDisplayRow> {
        self.filtered()
            .into_iter()
            .map(|command| GenericDisplayRow {
                name: command.id.clone(),
                icon: (!command.icon.is_empty()).then(|| command.icon.clone()),
                description: Some(command.description.clone()),
            })
            .collect()
    }
}

impl WidgetRef for CommandPopup {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        render_rows(
            area,
            buf,
            &self.rows(),
            &self.state,
            MAX_POPUP_ROWS,
            "no matching commands",
        );
    }
}
