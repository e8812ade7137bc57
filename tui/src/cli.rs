use std::path::PathBuf;

use clap::Parser;

/// Terminal chat composer with slash commands.
#[derive(Parser, Debug, Default)]
#[command(version)]
pub struct Cli {
    /// TOML file holding the command registry. Falls back to a built-in
    /// demo registry when omitted.
    #[arg(long, value_name = "FILE")]
    pub commands: Option<PathBuf>,
}
