//! pomodoro - Pomodoro timer with persistent sessions
//!
//! Usage:
//!   pomodoro start              Start the current session (or resume)
//!   pomodoro pause              Pause the running session
//!   pomodoro resume             Resume a paused session
//!   pomodoro stop               Stop and reset
//!   pomodoro status             Show the current session (default)
//!   pomodoro skip               Finish the current session now
//!   pomodoro config [OPTIONS]   Show or change durations
//!   pomodoro interactive        Full-screen timer

mod cli;
mod interactive;

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tomato_core::{logging, Paths};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::new();
    let command = cli.command.unwrap_or(Commands::Status);

    if let Commands::Interactive = command {
        // The screen belongs to the UI; logs go to a file
        logging::init_file(&paths.log_file(), cli.verbose)?;
    } else {
        logging::init_stderr(cli.verbose);
        if !std::io::stdout().is_terminal() {
            colored::control::set_override(false);
        }
    }

    cli::run(command, &paths)
}
