//! kata parse - Parse a problem statement into display blocks
//!
//! Debugging aid for the statement parser: feed it a raw statement and see
//! the block sequence the API would serve.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputMode, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::prompt::{self, Block};

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Statement file to parse (reads stdin when omitted)
    pub file: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &ParseArgs) -> Result<()> {
    let raw = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let document = prompt::parse(&raw);

    match ctx.output_mode {
        OutputMode::Robot => emit_robot(&robot_ok(&document)),
        OutputMode::Human => {
            let mut layout = HumanLayout::new();
            layout.section("Description");
            push_rows(&mut layout, &document.description);
            if !document.examples.is_empty() {
                layout.blank().section("Examples");
                push_rows(&mut layout, &document.examples);
            }
            emit_human(layout);
            Ok(())
        }
    }
}

/// One row per block, tagged with the block kind the API would emit.
fn push_rows(layout: &mut HumanLayout, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Spacer => layout.kv("spacer", ""),
            Block::Paragraph { text } => layout.kv("paragraph", text),
            Block::ExampleHeader { text } => layout.kv("example_header", text),
            Block::LabeledField { label, value } => {
                layout.kv("labeled_field", &format!("{label}: {value}"))
            }
            Block::PlainLine { text } => layout.kv("plain_line", text),
        };
    }
}
