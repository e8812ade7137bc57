//! The bottom pane is the interactive footer of the chat UI: the
//! editable composer input, the inline slash-command menu above it, and
//! the chip row (Tools trigger + command chips) below it.
//!
//! Input routing is layered: the pane decides which surface receives an
//! event (the open Tools popover wins, otherwise the composer), while
//! the selection itself lives here, never inside a menu widget. Widgets
//! report commits back as results and the pane turns them into state
//! changes plus [`AppEvent`] notifications.

use std::time::Instant;

use banter_protocol::commands::Command;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::WidgetRef;

use crate::app_event::AppEvent;
use crate::app_event::AppEventSender;

mod chat_composer;
mod command_buttons;
mod command_popup;
mod pointer_debounce;
pub mod popup_consts;
mod scroll_state;
mod selection_popup_common;
mod textarea;
mod tools_popup;

pub use chat_composer::ChatComposer;
pub use chat_composer::InputResult;
pub use command_buttons::CommandChip;
use command_buttons::ChipTarget;
use tools_popup::ToolsPopup;

/// A message the user finished composing, annotated with the command
/// that was selected at send time (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub text: String,
    pub command: Option<Command>,
}

struct PaneLayout {
    popup: Rect,
    input: Rect,
    chips: Rect,
}

/// Pane displayed in the lower part of the chat UI. Owns the composer,
/// the current command selection, and the open/closed state of the
/// Tools popover.
pub struct BottomPane {
    composer: ChatComposer,
    commands: Vec<Command>,
    /// At most one selected command per composer session.
    selected_command: Option<Command>,
    /// `Some` while the Tools popover is open.
    tools_popup: Option<ToolsPopup>,
    app_event_tx: AppEventSender,
}

impl BottomPane {
    pub fn new(commands: Vec<Command>, app_event_tx: AppEventSender) -> Self {
        Self {
            composer: ChatComposer::new(commands.clone(), app_event_tx.clone()),
            commands,
            selected_command: None,
            tools_popup: None,
            app_event_tx,
        }
    }

    pub fn selected_command(&self) -> Option<&Command> {
        self.selected_command.as_ref()
    }

    pub fn composer_text(&self) -> &str {
        self.composer.text()
    }

    pub fn tools_popup_open(&self) -> bool {
        self.tools_popup.is_some()
    }

    /// Chips currently shown in the button row, in render order.
    pub fn chips(&self) -> Vec<CommandChip> {
        command_buttons::chip_row(&self.commands, self.selected_id())
    }

    /// Identity strings of the visible chips (`command-<id>`).
    pub fn chip_identities(&self) -> Vec<String> {
        self.chips().iter().map(CommandChip::identity).collect()
    }

    /// Whether the Tools trigger (`command-button`) is rendered.
    pub fn tools_trigger_visible(&self) -> bool {
        tools_popup::trigger_visible(&self.commands)
    }

    /// Replace the registry snapshot. A selection whose command vanished
    /// from the registry is dropped.
    pub fn set_commands(&mut self, commands: Vec<Command>) {
        self.commands = commands;
        self.composer.set_commands(self.commands.clone());
        if self
            .selected_command
            .as_ref()
            .is_some_and(|sel| !self.commands.iter().any(|c| c.id == sel.id))
        {
            self.selected_command = None;
        }
        if self.tools_popup.is_some() {
            self.tools_popup = ToolsPopup::new(&self.commands);
        }
    }

    /// Clear input text, close any open menu, and clear the selection
    /// unless it is marked persistent.
    pub fn reset(&mut self) {
        self.composer.clear_text();
        self.tools_popup = None;
        if self
            .selected_command
            .as_ref()
            .is_some_and(|cmd| !cmd.persistent)
        {
            self.set_selection(None);
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Option<UserMessage> {
        self.handle_key_event_at(key_event, Instant::now())
    }

    /// Same as [`Self::handle_key_event`] with an explicit clock.
    pub fn handle_key_event_at(&mut self, key_event: KeyEvent, now: Instant) -> Option<UserMessage> {
        if let Some(popup) = &mut self.tools_popup {
            match key_event.code {
                KeyCode::Up => popup.move_up(now),
                KeyCode::Down => popup.move_down(now),
                KeyCode::Esc => self.tools_popup = None,
                KeyCode::Enter => {
                    let selected = popup.selected_command().cloned();
                    self.tools_popup = None;
                    if let Some(command) = selected {
                        self.set_selection(Some(command));
                    }
                }
                _ => {}
            }
            return None;
        }

        let (result, _) = self.composer.handle_key_event_at(key_event, now);
        self.apply_input_result(result)
    }

    pub fn handle_mouse_event(&mut self, mouse_event: MouseEvent, area: Rect) -> Option<UserMessage> {
        self.handle_mouse_event_at(mouse_event, area, Instant::now())
    }

    /// Route a mouse event through the pane layout for `area` (the same
    /// rect the pane was last rendered into).
    pub fn handle_mouse_event_at(
        &mut self,
        mouse_event: MouseEvent,
        area: Rect,
        now: Instant,
    ) -> Option<UserMessage> {
        let layout = self.layout(area);
        let (x, y) = (mouse_event.column, mouse_event.row);
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(target) =
                    command_buttons::hit_test(layout.chips, &self.commands, self.selected_id(), x, y)
                {
                    match target {
                        ChipTarget::ToolsTrigger => self.toggle_tools_popup(),
                        ChipTarget::Chip(id) => self.toggle_selection(&id),
                    }
                    return None;
                }
                if let Some(popup) = &mut self.tools_popup {
                    if let Some(idx) = popup.hit_test_row(layout.popup, x, y) {
                        popup.set_highlight(idx);
                        let selected = popup.selected_command().cloned();
                        self.tools_popup = None;
                        if let Some(command) = selected {
                            self.set_selection(Some(command));
                        }
                    }
                    return None;
                }
                if let Some(idx) = self.composer.popup_hit_test(layout.popup, x, y) {
                    let (result, _) = self.composer.on_popup_click(idx);
                    return self.apply_input_result(result);
                }
                None
            }
            MouseEventKind::Moved => {
                if let Some(popup) = &mut self.tools_popup {
                    match popup.hit_test_row(layout.popup, x, y) {
                        Some(idx) => popup.on_pointer_move(idx, now),
                        None => popup.on_pointer_leave(now),
                    }
                } else {
                    match self.composer.popup_hit_test(layout.popup, x, y) {
                        Some(idx) => {
                            self.composer.on_popup_pointer_move(idx, now);
                        }
                        None => self.composer.on_popup_pointer_leave(now),
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Open the Tools popover if it can show anything, close it if open.
    pub fn toggle_tools_popup(&mut self) {
        self.tools_popup = if self.tools_popup.is_some() {
            None
        } else {
            ToolsPopup::new(&self.commands)
        };
    }

    /// Total height the pane wants for `area.width` columns.
    pub fn desired_height(&self) -> u16 {
        self.popup_height() + 1 + u16::from(self.chip_row_visible())
    }

    /// Terminal cursor position while the composer has focus.
    pub fn cursor_pos(&self, area: Rect) -> (u16, u16) {
        self.composer.cursor_pos(self.layout(area).input)
    }

    fn selected_id(&self) -> Option<&str> {
        self.selected_command.as_ref().map(|c| c.id.as_str())
    }

    fn chip_row_visible(&self) -> bool {
        command_buttons::has_content(&self.commands, self.selected_id())
    }

    fn popup_height(&self) -> u16 {
        match &self.tools_popup {
            Some(popup) => popup.calculate_required_height(),
            None => self.composer.popup_height(),
        }
    }

    fn layout(&self, area: Rect) -> PaneLayout {
        let chip_h = u16::from(self.chip_row_visible()).min(area.height);
        let input_h = 1u16.min(area.height.saturating_sub(chip_h));
        let popup_h = self
            .popup_height()
            .min(area.height.saturating_sub(chip_h + input_h));
        let input_y = area.y + area.height - chip_h - input_h;
        PaneLayout {
            popup: Rect::new(area.x, input_y.saturating_sub(popup_h), area.width, popup_h),
            input: Rect::new(area.x, input_y, area.width, input_h),
            chips: Rect::new(
                area.x,
                area.y + area.height - chip_h,
                area.width,
                chip_h,
            ),
        }
    }

    /// Clicking a chip toggles: the selected chip clears the selection,
    /// any other chip replaces it.
    fn toggle_selection(&mut self, id: &str) {
        if self.selected_id() == Some(id) {
            self.set_selection(None);
        } else if let Some(command) = self.commands.iter().find(|c| c.id == id).cloned() {
            self.set_selection(Some(command));
        }
    }

    fn set_selection(&mut self, command: Option<Command>) {
        self.selected_command = command.clone();
        self.app_event_tx.send(AppEvent::CommandSelected(command));
    }

    fn apply_input_result(&mut self, result: InputResult) -> Option<UserMessage> {
        match result {
            InputResult::Submitted(text) => Some(UserMessage {
                text,
                command: self.selected_command.clone(),
            }),
            InputResult::CommandSelected(command) => {
                self.set_selection(Some(command));
                None
            }
            InputResult::None => None,
        }
    }
}

impl WidgetRef for BottomPane {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let layout = self.layout(area);
        match &self.tools_popup {
            Some(popup) => popup.render_ref(layout.popup, buf),
            None => self.composer.render_popup(layout.popup, buf),
        }
        self.composer.render_ref(layout.input, buf);
        if layout.chips.height > 0 {
            command_buttons::render_chip_row(
                layout.chips,
                buf,
                &self.commands,
                self.selected_id(),
                self.tools_popup.is_some(),
            );
        }
    }
}
