//! kata show - Show today's question
//!
//! Resolves the daily question exactly like the HTTP endpoint does (cached
//! active set, upstream refetch, built-in fallback) and renders the parsed
//! statement.

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputMode, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::prompt::{self, Block};
use crate::questions::{self, Difficulty};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Question difficulty
    #[arg(long, default_value = "easy")]
    pub difficulty: Difficulty,

    /// Include test case inputs
    #[arg(long)]
    pub cases: bool,
}

pub fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let question = runtime.block_on(questions::daily_question(
        &ctx.store,
        &ctx.config,
        args.difficulty,
    ))?;
    let document = prompt::parse(&question.description);

    match ctx.output_mode {
        OutputMode::Robot => emit_robot(&robot_ok(serde_json::json!({
            "problem_id": question.problem_id,
            "title": question.title,
            "difficulty": args.difficulty.as_str(),
            "starter_code": question.starter_code,
            "prompt": document,
            "test_cases": question.test_cases.inputs,
        }))),
        OutputMode::Human => {
            let mut layout = HumanLayout::new();
            let title = question.title.as_deref().unwrap_or(&question.problem_id);
            layout.title(title);
            layout.kv("Problem", &question.problem_id);
            layout.kv("Difficulty", args.difficulty.as_str());
            layout.blank();

            push_blocks(&mut layout, &document.description);
            push_blocks(&mut layout, &document.examples);

            layout.blank().section("Starter code");
            for line in question.starter_code.lines() {
                layout.push_line(line);
            }

            if args.cases {
                layout.blank().section("Test inputs");
                for case in &question.test_cases.inputs {
                    layout.bullet(&serde_json::Value::Array(case.clone()).to_string());
                }
            }

            emit_human(layout);
            Ok(())
        }
    }
}

fn push_blocks(layout: &mut HumanLayout, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Spacer => {
                layout.blank();
            }
            Block::Paragraph { text } | Block::PlainLine { text } => {
                layout.push_line(text.clone());
            }
            Block::ExampleHeader { text } => {
                layout.blank().section(text);
            }
            Block::LabeledField { label, value } => {
                layout.kv(label, value);
            }
        }
    }
}
