//! Problem-statement parsing.
//!
//! Practice questions arrive as loosely formatted plaintext: a free-form
//! description, an optional "Constraints:" tail, and "Example N:" blocks
//! carrying `Input:`/`Output:`/`Explanation:` fields. [`parse`] normalizes
//! that text into an ordered sequence of typed blocks so the frontend can
//! render a statement without re-interpreting the source. Authors pad
//! statements inconsistently, so nothing here rejects input: unrecognized
//! lines degrade to plain text instead of failing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EXAMPLE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Example\s+\d+:").expect("valid regex"));

static LABELED_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Input|Output|Explanation):\s*(.*)$").expect("valid regex"));

/// One classified, renderable unit of statement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// A vertical gap standing in for a compressed run of blank source lines.
    Spacer,
    /// A single non-blank description line, trimmed.
    Paragraph { text: String },
    /// An `Example N:` heading. The text is the full trimmed line; anything
    /// after the colon stays part of the heading.
    ExampleHeader { text: String },
    /// An `Input:`/`Output:`/`Explanation:` line. The label keeps the case
    /// it had in the source; the value is everything after the colon and
    /// the whitespace that follows it.
    LabeledField { label: String, value: String },
    /// Any other non-blank line inside the examples region, trimmed.
    PlainLine { text: String },
}

/// A parsed statement: description blocks followed by example blocks.
///
/// The split point is the first `Example N:` heading. Consumers render the
/// two sequences back to back; the split only tells them where the examples
/// start. `description` holds only `Paragraph`/`Spacer` entries, `examples`
/// holds everything else. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub description: Vec<Block>,
    pub examples: Vec<Block>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.examples.is_empty()
    }

    /// All blocks in render order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.description.iter().chain(self.examples.iter())
    }
}

/// An entry surviving blank-run compression: either one rendered gap or a
/// trimmed non-blank line.
enum Entry<'a> {
    Gap,
    Text(&'a str),
}

/// Parses raw statement text into a [`Document`].
///
/// Total over all inputs: empty text, text without examples, and malformed
/// headings all produce a (possibly empty) document, never an error. Three
/// passes run in order: drop everything from the first `Constraints:` line
/// on, halve runs of blank lines, then split at the first example heading
/// and classify each surviving line.
pub fn parse(raw: &str) -> Document {
    let lines = truncate_constraints(raw);
    let entries = compress_blank_runs(&lines);
    segment(entries)
}

/// Splits on `\n` (tolerating `\r\n`) and cuts the statement off at the
/// first line whose trimmed content starts with `Constraints:`. The match
/// is deliberately case-sensitive, unlike the heading and label matches
/// below; authored statements capitalize it and the lowercase form is not
/// recognized as a section break.
fn truncate_constraints(raw: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = raw
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    if let Some(idx) = lines
        .iter()
        .position(|line| line.trim().starts_with("Constraints:"))
    {
        lines.truncate(idx);
    }

    lines
}

/// Folds over the lines keeping a pending-blank counter: before each
/// non-blank line, a run of `k` blanks collapses to `floor(k/2)` gaps, so
/// double-spaced source reads single-spaced while long separations keep a
/// gap. The trailing run is flushed the same way.
fn compress_blank_runs<'a>(lines: &[&'a str]) -> Vec<Entry<'a>> {
    let mut entries = Vec::with_capacity(lines.len());
    let mut pending_blanks = 0usize;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            pending_blanks += 1;
            continue;
        }
        for _ in 0..pending_blanks / 2 {
            entries.push(Entry::Gap);
        }
        pending_blanks = 0;
        entries.push(Entry::Text(trimmed));
    }

    for _ in 0..pending_blanks / 2 {
        entries.push(Entry::Gap);
    }

    entries
}

/// Splits the compressed entries at the first example heading and
/// classifies each side.
fn segment(entries: Vec<Entry<'_>>) -> Document {
    let split = entries.iter().position(|entry| match entry {
        Entry::Text(text) => EXAMPLE_HEADER_RE.is_match(text),
        Entry::Gap => false,
    });

    let (description, examples) = match split {
        Some(idx) => entries.split_at(idx),
        None => (entries.as_slice(), &[][..]),
    };

    Document {
        description: description.iter().map(description_block).collect(),
        examples: examples.iter().map(example_block).collect(),
    }
}

fn description_block(entry: &Entry<'_>) -> Block {
    match entry {
        Entry::Gap => Block::Spacer,
        Entry::Text(text) => Block::Paragraph {
            text: (*text).to_string(),
        },
    }
}

/// Classifies one examples-region entry in priority order: example heading,
/// then labeled field, then plain text.
fn example_block(entry: &Entry<'_>) -> Block {
    let text = match entry {
        Entry::Gap => return Block::Spacer,
        Entry::Text(text) => *text,
    };

    if EXAMPLE_HEADER_RE.is_match(text) {
        return Block::ExampleHeader {
            text: text.to_string(),
        };
    }

    if let Some(caps) = LABELED_FIELD_RE.captures(text) {
        return Block::LabeledField {
            label: caps[1].to_string(),
            value: caps[2].to_string(),
        };
    }

    Block::PlainLine {
        text: text.to_string(),
    }
}
