//! kata leaderboard - Show the current leaderboard

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputMode, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::leaderboard;

#[derive(Args, Debug)]
pub struct LeaderboardArgs {
    /// Maximum standings to display (overrides config)
    #[arg(long)]
    pub limit: Option<u32>,
}

pub fn run(ctx: &AppContext, args: &LeaderboardArgs) -> Result<()> {
    let limit = args.limit.unwrap_or(ctx.config.leaderboard.size);
    let board = leaderboard::current(&ctx.store, limit)?;

    match ctx.output_mode {
        OutputMode::Robot => emit_robot(&robot_ok(&board)),
        OutputMode::Human => {
            let mut layout = HumanLayout::new();
            layout.section("Leaderboard");
            if board.standings.is_empty() {
                layout.push_line("No submissions recorded yet.");
            }
            for (rank, standing) in board.standings.iter().enumerate() {
                layout.push_line(format!(
                    "{:>2}. {:<20} solved {:>3}  attempts {:>3}",
                    rank + 1,
                    standing.user_id,
                    standing.solved,
                    standing.attempts
                ));
            }
            emit_human(layout);
            Ok(())
        }
    }
}
