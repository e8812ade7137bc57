//! Minimal host application: a transcript of sent messages above the
//! composer pane. It exists to exercise the pane end to end; everything
//! interesting lives in [`crate::bottom_pane`].

use std::sync::mpsc::Receiver;

use banter_protocol::commands::Command;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::DefaultTerminal;
use ratatui::Frame;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::widgets::WidgetRef;

use crate::app_event::AppEvent;
use crate::app_event::AppEventSender;
use crate::bottom_pane::BottomPane;
use crate::bottom_pane::UserMessage;

pub struct App {
    bottom_pane: BottomPane,
    app_event_rx: Receiver<AppEvent>,
    transcript: Vec<String>,
    /// Rect the pane was last rendered into; mouse events are routed
    /// through the same layout.
    pane_area: Rect,
    quit: bool,
}

impl App {
    pub fn new(commands: Vec<Command>) -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        Self {
            bottom_pane: BottomPane::new(commands, AppEventSender::new(tx)),
            app_event_rx: rx,
            transcript: Vec::new(),
            pane_area: Rect::default(),
            quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        while !self.quit {
            terminal.draw(|frame| self.draw(frame))?;
            match crossterm::event::read()? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    self.handle_key_event(key_event);
                }
                Event::Mouse(mouse_event) => {
                    if let Some(message) =
                        self.bottom_pane.handle_mouse_event(mouse_event, self.pane_area)
                    {
                        self.push_message(message);
                    }
                }
                _ => {}
            }
            self.drain_app_events();
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event {
            KeyEvent {
                code: KeyCode::Char('c') | KeyCode::Char('d'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.quit = true,
            _ => {
                if let Some(message) = self.bottom_pane.handle_key_event(key_event) {
                    self.push_message(message);
                }
            }
        }
    }

    fn push_message(&mut self, message: UserMessage) {
        let UserMessage { text, command } = message;
        let line = match command {
            Some(command) => format!("[{}] {text}", command.id),
            None => text,
        };
        tracing::info!("message sent: {line}");
        self.transcript.push(line);
        self.bottom_pane.reset();
    }

    fn drain_app_events(&mut self) {
        for event in self.app_event_rx.try_iter() {
            tracing::debug!(?event, "composer event");
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let pane_height = self.bottom_pane.desired_height().min(area.height);
        let transcript_area = Rect {
            height: area.height - pane_height,
            ..area
        };
        self.pane_area = Rect {
            y: area.y + transcript_area.height,
            height: pane_height,
            ..area
        };

        let visible = transcript_area.height as usize;
        let skip = self.transcript.len().saturating_sub(visible);
        let lines: Vec<Line> = self.transcript[skip..]
            .iter()
            .map(|line| Line::from(line.as_str()))
            .collect();
        frame.render_widget(Paragraph::new(lines), transcript_area);

        self.bottom_pane.render_ref(self.pane_area, frame.buffer_mut());
        frame.set_cursor_position(Position::from(self.bottom_pane.cursor_pos(self.pane_area)));
    }
}
