//! kata refresh - Fetch a fresh question set from the upstream API

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputMode, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::questions;

#[derive(Args, Debug)]
pub struct RefreshArgs {
    /// Questions to request per difficulty (overrides config)
    #[arg(long)]
    pub count: Option<u32>,
}

pub fn run(ctx: &AppContext, args: &RefreshArgs) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(count) = args.count {
        config.upstream.count = count;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let active = runtime.block_on(questions::refresh_active(&ctx.store, &config))?;

    match ctx.output_mode {
        OutputMode::Robot => emit_robot(&robot_ok(serde_json::json!({
            "easy": active.easy.len(),
            "hard": active.hard.len(),
            "timestamp": active.timestamp,
        }))),
        OutputMode::Human => {
            let mut layout = HumanLayout::new();
            layout
                .title("Question set refreshed")
                .kv("Easy", &active.easy.len().to_string())
                .kv("Hard", &active.hard.len().to_string())
                .kv("Stamped", &active.timestamp.format("%Y-%m-%d").to_string());
            emit_human(layout);
            Ok(())
        }
    }
}
