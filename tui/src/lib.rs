// Forbid accidental stdout/stderr writes in the library portion of the
// TUI; anything printed while the alternate screen is active corrupts it.
#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::fs::OpenOptions;
use std::path::Path;

use banter_protocol::commands::Command;
use banter_protocol::commands::CommandRegistry;
use color_eyre::eyre::WrapErr;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
pub mod app_event;
pub mod bottom_pane;
mod cli;

pub use app::App;
pub use app_event::AppEvent;
pub use app_event::AppEventSender;
pub use cli::Cli;

pub fn run_main(cli: Cli) -> color_eyre::Result<()> {
    color_eyre::install()?;
    let _log_guard = init_logging()?;
    let commands = load_commands(cli.commands.as_deref())?;
    run_ratatui_app(commands)
}

fn run_ratatui_app(commands: Vec<Command>) -> color_eyre::Result<()> {
    let mut terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = App::new(commands).run(&mut terminal);
    // Always restore the terminal, even when the app errored.
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

fn init_logging() -> color_eyre::Result<WorkerGuard> {
    let log_dir = std::env::temp_dir().join("banter-tui");
    std::fs::create_dir_all(&log_dir)?;

    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);
    // Keep the log private to the current user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }
    let log_file = log_file_opts.open(log_dir.join("banter-tui.log"))?;
    let (non_blocking, guard) = non_blocking(log_file);

    // RUST_LOG wins; default to info for our crates.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("banter_tui=info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_ansi(false)
        .with_filter(env_filter);
    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    Ok(guard)
}

fn load_commands(path: Option<&Path>) -> color_eyre::Result<Vec<Command>> {
    let Some(path) = path else {
        return Ok(default_commands());
    };
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let registry: CommandRegistry =
        toml::from_str(&raw).wrap_err_with(|| format!("failed to parse {}", path.display()))?;
    Ok(registry.commands)
}

fn default_commands() -> Vec<Command> {
    vec![
        Command {
            id: "Picture".to_string(),
            description: "Use DALL-E".to_string(),
            icon: "image".to_string(),
            button: false,
            persistent: false,
        },
        Command {
            id: "Search".to_string(),
            description: "Find on the web".to_string(),
            icon: "globe".to_string(),
            button: true,
            persistent: false,
        },
        Command {
            id: "Canvas".to_string(),
            description: "Collaborate on writing and code".to_string(),
            icon: "pen-line".to_string(),
            button: false,
            persistent: false,
        },
    ]
}
