use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod output;

pub use commands::Commands;
pub use output::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "kata", version, about = "Self-hosted daily coding practice")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a config file (skips config discovery)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output entirely
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.robot {
            OutputMode::Robot
        } else {
            OutputMode::Human
        }
    }
}
