//! End-to-end command flows driven through the pane's public surface:
//! key and mouse events in, rendered buffers and chip identities out.

use banter_protocol::commands::Command;
use banter_tui::AppEvent;
use banter_tui::AppEventSender;
use banter_tui::bottom_pane::BottomPane;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use pretty_assertions::assert_eq;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::WidgetRef;
use std::sync::mpsc::Receiver;

const AREA: Rect = Rect {
    x: 0,
    y: 0,
    width: 48,
    height: 10,
};

fn command(id: &str, description: &str, button: bool) -> Command {
    Command {
        id: id.to_string(),
        description: description.to_string(),
        icon: String::new(),
        button,
        persistent: false,
    }
}

fn registry() -> Vec<Command> {
    vec![
        command("Picture", "Use DALL-E", false),
        command("Search", "Find on the web", true),
        command("Canvas", "Collaborate on writing and code", false),
    ]
}

fn pane() -> (BottomPane, Receiver<AppEvent>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (BottomPane::new(registry(), AppEventSender::new(tx)), rx)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_str(pane: &mut BottomPane, text: &str) {
    for ch in text.chars() {
        pane.handle_key_event(key(KeyCode::Char(ch)));
    }
}

fn click(x: u16, y: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: x,
        row: y,
        modifiers: KeyModifiers::NONE,
    }
}

fn render(pane: &BottomPane) -> Buffer {
    let mut buf = Buffer::empty(AREA);
    pane.render_ref(AREA, &mut buf);
    buf
}

fn row_text(buf: &Buffer, y: u16) -> String {
    (AREA.x..AREA.x + AREA.width)
        .map(|x| buf[(x, y)].symbol().to_string())
        .collect::<String>()
        .trim_end()
        .to_string()
}

// Layout inside AREA: chip row on the bottom line, input above it, menu
// rows directly above the input.
const CHIPS_Y: u16 = AREA.height - 1;
const INPUT_Y: u16 = AREA.height - 2;

#[test]
fn slash_lists_every_command_in_registry_order() {
    let (mut pane, _rx) = pane();
    type_str(&mut pane, "/");

    // 3 menu rows + input + chip row.
    assert_eq!(pane.desired_height(), 5);
    let buf = render(&pane);
    assert!(row_text(&buf, INPUT_Y - 3).starts_with("Picture"));
    assert!(row_text(&buf, INPUT_Y - 2).starts_with("Search"));
    assert!(row_text(&buf, INPUT_Y - 1).starts_with("Canvas"));
}

#[test]
fn narrowing_then_enter_selects_picture() {
    let (mut pane, _rx) = pane();
    type_str(&mut pane, "/pic");

    let buf = render(&pane);
    assert!(row_text(&buf, INPUT_Y - 1).starts_with("Picture"));
    assert_eq!(pane.desired_height(), 3);

    pane.handle_key_event(key(KeyCode::Enter));
    assert_eq!(pane.composer_text(), "");
    assert_eq!(
        pane.chip_identities(),
        vec!["command-Picture", "command-Search"]
    );
}

#[test]
fn sending_a_message_clears_the_selection() {
    let (mut pane, _rx) = pane();
    type_str(&mut pane, "/pic");
    pane.handle_key_event(key(KeyCode::Enter));
    type_str(&mut pane, "a cat wearing a hat");
    let message = pane
        .handle_key_event(key(KeyCode::Enter))
        .expect("message should be submitted");
    assert_eq!(message.text, "a cat wearing a hat");
    assert_eq!(message.command.map(|c| c.id), Some("Picture".to_string()));

    pane.reset();
    assert_eq!(pane.selected_command(), None);
    assert_eq!(pane.chip_identities(), vec!["command-Search"]);
}

#[test]
fn escape_dismisses_the_menu_but_keeps_the_text() {
    let (mut pane, _rx) = pane();
    type_str(&mut pane, "/pic");
    assert_eq!(pane.desired_height(), 3);

    pane.handle_key_event(key(KeyCode::Esc));
    assert_eq!(pane.desired_height(), 2);
    assert_eq!(pane.composer_text(), "/pic");
}

#[test]
fn tools_popover_selects_a_non_button_command() {
    let (mut pane, _rx) = pane();
    assert!(pane.tools_trigger_visible());

    // Click the Tools trigger at the start of the chip row.
    pane.handle_mouse_event(click(0, CHIPS_Y), AREA);
    assert!(pane.tools_popup_open());

    let buf = render(&pane);
    // The popover lists the non-button subset only.
    assert!(row_text(&buf, INPUT_Y - 2).starts_with("Picture"));
    assert!(row_text(&buf, INPUT_Y - 1).starts_with("Canvas"));

    pane.handle_key_event(key(KeyCode::Down));
    pane.handle_key_event(key(KeyCode::Enter));
    assert!(!pane.tools_popup_open());
    assert_eq!(
        pane.chip_identities(),
        vec!["command-Canvas", "command-Search"]
    );
}

#[test]
fn clicking_the_search_chip_toggles_the_selection() {
    let (mut pane, rx) = pane();
    // Chip row: "[ Tools ]" then "[ Search ]" starting at x 10.
    pane.handle_mouse_event(click(12, CHIPS_Y), AREA);
    assert_eq!(
        pane.selected_command().map(|c| c.id.as_str()),
        Some("Search")
    );
    let events: Vec<AppEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![AppEvent::CommandSelected(Some(command(
            "Search",
            "Find on the web",
            true
        )))]
    );

    pane.handle_mouse_event(click(12, CHIPS_Y), AREA);
    assert_eq!(pane.selected_command(), None);
    let events: Vec<AppEvent> = rx.try_iter().collect();
    assert_eq!(events, vec![AppEvent::CommandSelected(None)]);
}

#[test]
fn clicking_a_menu_row_commits_it() {
    let (mut pane, _rx) = pane();
    type_str(&mut pane, "/");
    // Second menu row (Search) sits two lines above the input.
    pane.handle_mouse_event(click(3, INPUT_Y - 2), AREA);
    assert_eq!(
        pane.selected_command().map(|c| c.id.as_str()),
        Some("Search")
    );
    assert_eq!(pane.composer_text(), "");
    assert_eq!(pane.desired_height(), 2);
}

#[test]
fn unknown_token_closes_the_menu_without_side_effects() {
    let (mut pane, _rx) = pane();
    type_str(&mut pane, "/nope");
    assert_eq!(pane.desired_height(), 2);

    // Enter now submits the literal text instead of selecting anything.
    let message = pane
        .handle_key_event(key(KeyCode::Enter))
        .expect("literal text should submit");
    assert_eq!(message.text, "/nope");
    assert_eq!(message.command, None);
}
