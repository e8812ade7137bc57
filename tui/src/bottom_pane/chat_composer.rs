//! The chat composer is the editable message input plus the inline
//! slash-command menu.
//!
//! Key routing follows a fixed shape: [`ChatComposer::handle_key_event`]
//! dispatches to a popup-specific handler when the inline menu is open
//! and to the plain editing handler otherwise, and after every handled
//! event [`ChatComposer::sync_command_popup`] re-derives the menu state
//! from the current text. The menu is open exactly while the text is a
//! single whitespace-free `/`-token with at least one match, except that
//! Esc dismisses it until the next edit.

use std::time::Instant;

use banter_protocol::commands::Command;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;

use crate::app_event::AppEvent;
use crate::app_event::AppEventSender;

use super::command_popup::CommandPopup;
use super::command_popup::filter_commands;
use super::textarea::TextArea;

/// Shown while the composer is empty.
const PLACEHOLDER: &str = "send a message, or / for a command";

/// Outcome of a key or pointer event handled by the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// Plain Enter with no menu open: submit the message text.
    Submitted(String),
    /// The user committed a command from the inline menu.
    CommandSelected(Command),
    None,
}

pub(crate) enum ActivePopup {
    None,
    Command(CommandPopup),
}

pub struct ChatComposer {
    textarea: TextArea,
    active_popup: ActivePopup,
    commands: Vec<Command>,
    app_event_tx: AppEventSender,
    /// Esc dismissed the menu; holds until the next text edit.
    popup_dismissed: bool,
}

impl ChatComposer {
    pub fn new(commands: Vec<Command>, app_event_tx: AppEventSender) -> Self {
        Self {
            textarea: TextArea::new(),
            active_popup: ActivePopup::None,
            commands,
            app_event_tx,
            popup_dismissed: false,
        }
    }

    pub fn text(&self) -> &str {
        self.textarea.text()
    }

    pub fn popup_active(&self) -> bool {
        matches!(self.active_popup, ActivePopup::Command(_))
    }

    pub(crate) fn command_popup(&self) -> Option<&CommandPopup> {
        match &self.active_popup {
            ActivePopup::Command(popup) => Some(popup),
            ActivePopup::None => None,
        }
    }

    /// Replace the registry snapshot (it can change between renders).
    pub fn set_commands(&mut self, commands: Vec<Command>) {
        self.commands = commands;
        if let ActivePopup::Command(_) = self.active_popup {
            // Rebuild so the open menu reflects the new snapshot.
            self.active_popup = ActivePopup::None;
            self.sync_command_popup();
        }
    }

    /// Clear the input, notifying the host like any other edit.
    pub fn clear_text(&mut self) {
        let before = self.textarea.text().to_string();
        self.textarea.set_text("");
        self.finish_event(&before);
    }

    /// Cursor position for the host terminal, given the input area.
    pub fn cursor_pos(&self, area: Rect) -> (u16, u16) {
        (area.x + self.textarea.cursor_col().min(area.width.saturating_sub(1)), area.y)
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        self.handle_key_event_at(key_event, Instant::now())
    }

    /// Same as [`Self::handle_key_event`] with an explicit clock, so the
    /// pointer/keyboard arbitration windows are testable.
    pub fn handle_key_event_at(&mut self, key_event: KeyEvent, now: Instant) -> (InputResult, bool) {
        let before = self.textarea.text().to_string();
        let result = match &self.active_popup {
            ActivePopup::Command(_) => self.handle_key_event_with_popup(key_event, now),
            ActivePopup::None => self.handle_key_event_without_popup(key_event),
        };
        self.finish_event(&before);
        result
    }

    /// Pointer moved over popup row `idx`.
    pub fn on_popup_pointer_move(&mut self, idx: usize, now: Instant) -> bool {
        if let ActivePopup::Command(popup) = &mut self.active_popup {
            popup.on_pointer_move(idx, now);
            return true;
        }
        false
    }

    /// Pointer left the popup area.
    pub fn on_popup_pointer_leave(&mut self, now: Instant) {
        if let ActivePopup::Command(popup) = &mut self.active_popup {
            popup.on_pointer_leave(now);
        }
    }

    /// Pointer clicked popup row `idx`: same contract as Enter on that row.
    pub fn on_popup_click(&mut self, idx: usize) -> (InputResult, bool) {
        let before = self.textarea.text().to_string();
        let result = match &mut self.active_popup {
            ActivePopup::Command(popup) => {
                popup.set_highlight(idx);
                self.commit_selected()
            }
            ActivePopup::None => (InputResult::None, false),
        };
        self.finish_event(&before);
        result
    }

    /// Map a pointer position inside the popup area to a row index.
    pub fn popup_hit_test(&self, area: Rect, x: u16, y: u16) -> Option<usize> {
        self.command_popup()
            .and_then(|popup| popup.hit_test_row(area, x, y))
    }

    /// Popup rows needed above the input line, 0 when closed.
    pub fn popup_height(&self) -> u16 {
        self.command_popup()
            .map(CommandPopup::calculate_required_height)
            .unwrap_or(0)
    }

    pub(crate) fn render_popup(&self, area: Rect, buf: &mut Buffer) {
        if let ActivePopup::Command(popup) = &self.active_popup {
            popup.render_ref(area, buf);
        }
    }

    fn handle_key_event_with_popup(&mut self, key_event: KeyEvent, now: Instant) -> (InputResult, bool) {
        let ActivePopup::Command(popup) = &mut self.active_popup else {
            return (InputResult::None, false);
        };
        match key_event {
            KeyEvent {
                code: KeyCode::Up, ..
            }
            | KeyEvent {
                code: KeyCode::Char('p'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                popup.move_up(now);
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Down,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('n'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                popup.move_down(now);
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Esc, ..
            } => {
                // Dismiss the menu; the typed text (slash included) stays.
                self.active_popup = ActivePopup::None;
                self.popup_dismissed = true;
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::NONE,
                ..
            }
            | KeyEvent {
                code: KeyCode::Tab, ..
            } => self.commit_selected(),
            _ => self.handle_editing_key(key_event),
        }
    }

    fn handle_key_event_without_popup(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        match key_event {
            KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::NONE,
                ..
            } => {
                let text = self.textarea.text().to_string();
                if text.trim().is_empty() {
                    return (InputResult::None, false);
                }
                self.textarea.set_text("");
                (InputResult::Submitted(text), true)
            }
            _ => self.handle_editing_key(key_event),
        }
    }

    fn handle_editing_key(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        match key_event {
            KeyEvent {
                code: KeyCode::Char(ch),
                modifiers,
                ..
            } if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.textarea.insert_char(ch);
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => (InputResult::None, self.textarea.backspace()),
            KeyEvent {
                code: KeyCode::Delete,
                ..
            } => (InputResult::None, self.textarea.delete_forward()),
            KeyEvent {
                code: KeyCode::Left,
                ..
            } => {
                self.textarea.move_left();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Right,
                ..
            } => {
                self.textarea.move_right();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::Home,
                ..
            } => {
                self.textarea.move_home();
                (InputResult::None, true)
            }
            KeyEvent {
                code: KeyCode::End, ..
            } => {
                self.textarea.move_end();
                (InputResult::None, true)
            }
            _ => (InputResult::None, false),
        }
    }

    /// Commit the highlighted command: report it selected, strip the
    /// `/token` from the input (left-trimming what remains), and close
    /// the menu. A no-op when the visible list is empty.
    fn commit_selected(&mut self) -> (InputResult, bool) {
        let ActivePopup::Command(popup) = &self.active_popup else {
            return (InputResult::None, false);
        };
        let Some(command) = popup.selected_command().cloned() else {
            return (InputResult::None, false);
        };
        let token = popup.filter_token();
        let stripped = self
            .textarea
            .text()
            .replacen(&token, "", 1)
            .trim_start()
            .to_string();
        self.textarea.set_text(&stripped);
        self.active_popup = ActivePopup::None;
        (InputResult::CommandSelected(command), true)
    }

    /// Post-event bookkeeping shared by the key and pointer paths.
    fn finish_event(&mut self, text_before: &str) {
        if self.textarea.text() != text_before {
            self.popup_dismissed = false;
            self.app_event_tx
                .send(AppEvent::ComposerTextChanged(self.textarea.text().to_string()));
        }
        self.sync_command_popup();
    }

    /// Derive the menu state from the current text: open over a single
    /// `/`-token with matches, closed otherwise.
    fn sync_command_popup(&mut self) {
        let token = slash_token(self.textarea.text());
        let Some(token) = token else {
            self.active_popup = ActivePopup::None;
            return;
        };
        if self.popup_dismissed {
            return;
        }
        match &mut self.active_popup {
            ActivePopup::Command(popup) => {
                popup.on_composer_text_change(token);
                if popup.is_empty() {
                    self.active_popup = ActivePopup::None;
                }
            }
            ActivePopup::None => {
                if !filter_commands(&self.commands, &token[1..]).is_empty() {
                    let mut popup = CommandPopup::new(self.commands.clone());
                    popup.on_composer_text_change(token);
                    self.active_popup = ActivePopup::Command(popup);
                }
            }
        }
    }
}

/// The command-detection token: the whole text when it is a single
/// whitespace-free word starting with `/`.
fn slash_token(text: &str) -> Option<&str> {
    let mut words = text.split(' ');
    let first = words.next().unwrap_or("");
    if words.next().is_some() || !first.starts_with('/') {
        return None;
    }
    Some(first)
}

impl WidgetRef for ChatComposer {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if self.textarea.is_empty() {
            Line::from(PLACEHOLDER.dim().italic()).render(area, buf);
        } else {
            Line::from(self.textarea.text().to_string()).render(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn command(id: &str, button: bool, persistent: bool) -> Command {
        Command {
            id: id.to_string(),
            description: format!("run {id}"),
            icon: "icon".to_string(),
            button,
            persistent,
        }
    }

    fn registry() -> Vec<Command> {
        vec![
            command("Search", true, false),
            command("Picture", false, false),
            command("Canvas", false, false),
        ]
    }

    fn composer() -> (ChatComposer, std::sync::mpsc::Receiver<AppEvent>) {
        let (tx, rx) = std::sync::mpsc::channel();
        (ChatComposer::new(registry(), AppEventSender::new(tx)), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(composer: &mut ChatComposer, text: &str) {
        for ch in text.chars() {
            composer.handle_key_event(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn slash_opens_menu_listing_all_commands() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/");
        let popup = composer.command_popup().expect("menu should be open");
        assert_eq!(popup.filtered().len(), 3);
        assert_eq!(popup.highlighted_idx(), Some(0));
    }

    #[test]
    fn menu_only_opens_for_a_single_slash_token() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "hello /");
        assert!(!composer.popup_active());

        let (mut composer, _rx) = self::composer();
        type_str(&mut composer, "/pic x");
        assert!(!composer.popup_active());
    }

    #[test]
    fn menu_closes_when_no_command_matches() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/zz");
        assert!(!composer.popup_active());
    }

    #[test]
    fn enter_commits_highlighted_command_and_strips_token() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/pic");
        let (result, _) = composer.handle_key_event(key(KeyCode::Enter));
        match result {
            InputResult::CommandSelected(cmd) => assert_eq!(cmd.id, "Picture"),
            other => panic!("expected a command selection, got {other:?}"),
        }
        assert_eq!(composer.text(), "");
        assert!(!composer.popup_active());
    }

    #[test]
    fn tab_commits_like_enter() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/can");
        let (result, _) = composer.handle_key_event(key(KeyCode::Tab));
        match result {
            InputResult::CommandSelected(cmd) => assert_eq!(cmd.id, "Canvas"),
            other => panic!("expected a command selection, got {other:?}"),
        }
    }

    #[test]
    fn plain_enter_submits_only_when_menu_is_closed() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/");
        let (result, _) = composer.handle_key_event(key(KeyCode::Enter));
        assert!(matches!(result, InputResult::CommandSelected(_)));

        type_str(&mut composer, "hello world");
        let (result, _) = composer.handle_key_event(key(KeyCode::Enter));
        assert_eq!(result, InputResult::Submitted("hello world".to_string()));
        assert_eq!(composer.text(), "");
    }

    #[test]
    fn empty_input_enter_is_a_no_op() {
        let (mut composer, _rx) = composer();
        let (result, redraw) = composer.handle_key_event(key(KeyCode::Enter));
        assert_eq!(result, InputResult::None);
        assert!(!redraw);
    }

    #[test]
    fn escape_dismisses_menu_but_keeps_text() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/pic");
        assert!(composer.popup_active());
        composer.handle_key_event(key(KeyCode::Esc));
        assert!(!composer.popup_active());
        assert_eq!(composer.text(), "/pic");

        // Esc again while closed is a no-op.
        let (result, _) = composer.handle_key_event(key(KeyCode::Esc));
        assert_eq!(result, InputResult::None);
        assert_eq!(composer.text(), "/pic");
    }

    #[test]
    fn editing_after_escape_reopens_the_menu() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/pi");
        composer.handle_key_event(key(KeyCode::Esc));
        assert!(!composer.popup_active());
        type_str(&mut composer, "c");
        assert!(composer.popup_active());
    }

    #[test]
    fn narrowing_to_picture_matches_scenario() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/");
        assert_eq!(composer.command_popup().expect("open").filtered().len(), 3);
        type_str(&mut composer, "pic");
        let popup = composer.command_popup().expect("open");
        assert_eq!(popup.filtered().len(), 1);
        assert_eq!(popup.selected_command().map(|c| c.id.as_str()), Some("Picture"));
    }

    #[test]
    fn pointer_click_commits_that_row() {
        let (mut composer, _rx) = composer();
        type_str(&mut composer, "/");
        let (result, _) = composer.on_popup_click(2);
        match result {
            InputResult::CommandSelected(cmd) => assert_eq!(cmd.id, "Canvas"),
            other => panic!("expected a command selection, got {other:?}"),
        }
        assert_eq!(composer.text(), "");
    }

    #[test]
    fn text_change_events_reach_the_host() {
        let (mut composer, rx) = composer();
        type_str(&mut composer, "hi");
        let events: Vec<AppEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                AppEvent::ComposerTextChanged("h".to_string()),
                AppEvent::ComposerTextChanged("hi".to_string()),
            ]
        );
    }

    #[test]
    fn commit_emits_stripped_text_change() {
        let (mut composer, rx) = composer();
        type_str(&mut composer, "/pic");
        let _ = rx.try_iter().count();
        composer.handle_key_event(key(KeyCode::Enter));
        let events: Vec<AppEvent> = rx.try_iter().collect();
        assert_eq!(events, vec![AppEvent::ComposerTextChanged(String::new())]);
    }
}
