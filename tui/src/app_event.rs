use std::sync::mpsc::Sender;

use banter_protocol::commands::Command;

/// Notifications the composer subsystem emits toward the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The user committed or toggled a command selection. `None` means
    /// the selection was cleared.
    CommandSelected(Option<Command>),
    /// The raw composer text changed.
    ComposerTextChanged(String),
}

/// Cloneable sender handed to UI components. Sending never panics; a
/// disconnected receiver is logged and otherwise ignored, which keeps
/// widget code free of channel error plumbing.
#[derive(Clone, Debug)]
pub struct AppEventSender {
    tx: Sender<AppEvent>,
}

impl AppEventSender {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: AppEvent) {
        if let Err(err) = self.tx.send(event) {
            tracing::warn!("dropping AppEvent: {err}");
        }
    }
}
