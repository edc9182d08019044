//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod doctor;
pub mod leaderboard;
pub mod parse;
pub mod refresh;
pub mod serve;
pub mod show;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Serve(args) => serve::run(ctx, args),
        Commands::Refresh(args) => refresh::run(ctx, args),
        Commands::Show(args) => show::run(ctx, args),
        Commands::Parse(args) => parse::run(ctx, args),
        Commands::Leaderboard(args) => leaderboard::run(ctx, args),
        Commands::Doctor(args) => doctor::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the practice API server
    Serve(serve::ServeArgs),

    /// Fetch a fresh question set from the upstream API
    Refresh(refresh::RefreshArgs),

    /// Show today's question
    Show(show::ShowArgs),

    /// Parse a problem statement into display blocks
    Parse(parse::ParseArgs),

    /// Show the current leaderboard
    Leaderboard(leaderboard::LeaderboardArgs),

    /// Check the local setup for problems
    Doctor(doctor::DoctorArgs),
}
