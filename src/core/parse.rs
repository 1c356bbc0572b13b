//! Purpose: Parse a flat key-value simulation-statistics report into a `StatsTree`.
//! Exports: `parse_report`, `END_SENTINEL`.
//! Role: First stage of the extract pipeline; pure over an iterator of lines.
//! Invariants: The first two lines are skipped without inspecting their content.
//! Invariants: Parsing stops permanently at the end-of-statistics sentinel.
//! Invariants: A non-blank line with no value token aborts the whole parse.
use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::{Error, ErrorKind};
use crate::core::tree::{Leaf, LeafValue, StatsTree};

/// Marker line content that ends the parseable region of a report.
pub const END_SENTINEL: &str = "---------- End Simulation Statistics ----------";

// Header noise emitted before the first data line in every report.
const HEADER_LINES: usize = 2;

// Permissive token scan, not a numeric grammar: contiguous runs over digits,
// `.`, `-`, and lowercase `e`. Artifacts like a lone `-` are captured on
// purpose; downstream consumers depend on this exact behavior. Tokens such
// as `nan` or `inf` fall entirely outside the class and yield nothing.
static VALUE_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9.\-e]+").expect("static token pattern"));

/// Parse report lines into a stats tree.
///
/// Values stay strings so the report's number formatting survives; a line
/// with exactly one token yields a single value, anything else yields an
/// ordered sequence (possibly empty). Duplicate dotted keys resolve
/// last-write-wins. Errors carry the 1-based line number of the input.
pub fn parse_report<I, S>(lines: I) -> Result<StatsTree, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tree = StatsTree::new();
    let mut consumed = 0u64;

    for (index, line) in lines.into_iter().enumerate().skip(HEADER_LINES) {
        let line = line.as_ref();
        if line.contains(END_SENTINEL) {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (key, rest) = trimmed.split_once(char::is_whitespace).ok_or_else(|| {
            Error::new(ErrorKind::Malformed)
                .with_message("statistic line has a key but no value")
                .with_line(index as u64 + 1)
                .with_hint(format!("Offending key: {trimmed}"))
        })?;

        let (value_part, description) = match rest.split_once('#') {
            Some((value_part, description)) => (value_part, description.trim()),
            None => (rest, ""),
        };

        let mut tokens: Vec<String> = VALUE_TOKENS
            .find_iter(value_part)
            .map(|found| found.as_str().to_string())
            .collect();
        let val = if tokens.len() == 1 {
            LeafValue::Single(tokens.remove(0))
        } else {
            LeafValue::Many(tokens)
        };

        tree.insert_leaf(
            key,
            Leaf {
                val,
                description: description.to_string(),
            },
        );
        consumed += 1;
    }

    tracing::debug!(
        lines = consumed,
        leaves = tree.leaf_count(),
        "parsed statistics report"
    );
    Ok(tree)
}
