use banter_tui::Cli;
use banter_tui::run_main;
use clap::Parser;

fn main() -> color_eyre::Result<()> {
    run_main(Cli::parse())
}
