//! CLI argument parsing.

use clap::{Parser, Subcommand};

/// Slot rotation service: shifts slot windows and locks expired credentials.
#[derive(Parser, Debug)]
#[command(name = "slotkeeper", version, about)]
pub struct Cli {
    /// Config profile; keys are read as `{PROFILE}_{KEY}` before `{KEY}`.
    #[arg(long, env = "SLOTKEEPER_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve the HTTP trigger routes (default).
    Serve,
    /// Run one update cycle (shift, then lock on success) and exit.
    Shift,
    /// Run one lock check and exit.
    Lock,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
