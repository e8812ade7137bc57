use std::time::Duration;

/// Maximum number of rows a popup shows before scrolling.
pub const MAX_POPUP_ROWS: usize = 5;

/// Minimum interval between pointer-driven highlight updates. Redraws
/// re-fire hover for the row under a stationary pointer; anything faster
/// than this is treated as synthetic.
pub const POINTER_DEBOUNCE: Duration = Duration::from_millis(50);

/// Arrow keys are ignored for this long after a genuine pointer move so
/// the highlight does not fight the mouse.
pub const KEYBOARD_AFTER_POINTER: Duration = Duration::from_millis(100);

/// Identity of the Tools trigger, kept in sync with the host's
/// integration tests.
pub const TOOLS_TRIGGER_ID: &str = "command-button";
