//! Rendering an [`EditScript`] for people and for prompts.
//!
//! Every rendered line carries a line number. Two counters run side by side,
//! one per input, and each op advances only the side(s) it touches:
//!
//! | op     | before | after | shown  | human decoration        |
//! |--------|--------|-------|--------|-------------------------|
//! | Equal  | +1     | +1    | before | `n: text`               |
//! | Delete | +1     |       | before | `-n: text` on light red |
//! | Insert |        | +1    | after  | `+n: text` on light green |
//!
//! Counters advance even for lines hidden by [`RenderOptions::only_changes`],
//! so a number always points at the same line of the input it came from.
//!
//! # Examples
//!
//! ```
//! use seodiff::diff::compute_edit_script;
//! use seodiff::render::{RenderOptions, render};
//!
//! let script = compute_edit_script(&["A\n", "B\n", "C\n"], &["A\n", "X\n", "C\n"]);
//! assert_eq!(render(&script, &RenderOptions::machine()), "1: A\n-2: B\n+2: X\n3: C");
//! ```

use crate::diff::{EditOp, EditScript};
use std::collections::HashSet;

/// Shown instead of a line whose content is empty
pub const BLANK_LINE: &str = "[Blank Line]";

const ADDED_STYLE: &str = "background-color: #ddffdd;";
const REMOVED_STYLE: &str = "background-color: #ffdddd;";
const HUMAN_SEPARATOR: &str = "<br>";
const MACHINE_SEPARATOR: &str = "\n";

/// How a single render pass decorates and filters its lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Escape `< > & " '` in unit content
    pub escape_markup: bool,
    /// Trim leading and trailing whitespace (line terminators included)
    pub strip_whitespace: bool,
    /// Plain numbered text joined with newlines instead of HTML
    pub for_machine_consumption: bool,
    /// Hide unchanged lines
    pub only_changes: bool,
}

impl RenderOptions {
    /// HTML view for a reader: escaped, unstripped.
    pub fn human() -> Self {
        Self {
            escape_markup: true,
            strip_whitespace: false,
            for_machine_consumption: false,
            only_changes: false,
        }
    }

    /// Prompt-ready view: unescaped, stripped, plain text.
    pub fn machine() -> Self {
        Self {
            escape_markup: false,
            strip_whitespace: true,
            for_machine_consumption: true,
            only_changes: false,
        }
    }

    #[must_use]
    pub fn only_changes(mut self, only_changes: bool) -> Self {
        self.only_changes = only_changes;
        self
    }
}

/// Independent 1-based line counters for the two inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounters {
    pub before: usize,
    pub after: usize,
}

impl LineCounters {
    /// Advance past `op`, returning the line number to show for it.
    pub fn advance(&mut self, op: &EditOp) -> usize {
        match op {
            EditOp::Equal(_) => {
                self.before += 1;
                self.after += 1;
                self.before
            }
            EditOp::Insert(_) => {
                self.after += 1;
                self.after
            }
            EditOp::Delete(_) => {
                self.before += 1;
                self.before
            }
        }
    }
}

/// Render `script` in one pass.
///
/// Each call starts its counters from zero, so the human and machine views
/// of one script are two independent calls.
pub fn render(script: &EditScript, options: &RenderOptions) -> String {
    let strip = options.strip_whitespace;
    let changed: HashSet<&str> = if options.only_changes && !options.for_machine_consumption {
        script
            .iter()
            .filter(|op| op.is_change())
            .map(|op| stripped(op.content(), strip))
            .collect()
    } else {
        HashSet::new()
    };

    let mut counters = LineCounters::default();
    let mut lines = Vec::with_capacity(script.len());

    for op in script {
        let number = counters.advance(op);
        let text = stripped(op.content(), strip);

        // Unchanged lines survive the filter in the HTML view only when the
        // same text was inserted or deleted somewhere else in the script.
        if options.only_changes && !op.is_change() && !changed.contains(text) {
            continue;
        }

        let content = if options.escape_markup {
            escape_markup(text)
        } else {
            text.to_string()
        };
        let content = if content.is_empty() {
            BLANK_LINE.to_string()
        } else {
            content
        };

        lines.push(decorate(op, number, &content, options.for_machine_consumption));
    }

    tracing::debug!(
        ops = script.len(),
        lines = lines.len(),
        machine = options.for_machine_consumption,
        only_changes = options.only_changes,
        "rendered diff"
    );

    let separator = if options.for_machine_consumption {
        MACHINE_SEPARATOR
    } else {
        HUMAN_SEPARATOR
    };
    lines.join(separator)
}

fn stripped(content: &str, strip: bool) -> &str {
    if strip { content.trim() } else { content }
}

fn decorate(op: &EditOp, number: usize, content: &str, machine: bool) -> String {
    match (op, machine) {
        (EditOp::Equal(_), _) => format!("{number}: {content}"),
        (EditOp::Insert(_), true) => format!("+{number}: {content}"),
        (EditOp::Delete(_), true) => format!("-{number}: {content}"),
        (EditOp::Insert(_), false) => {
            format!("<span style='{ADDED_STYLE}'>+{number}: {content}</span>")
        }
        (EditOp::Delete(_), false) => {
            format!("<span style='{REMOVED_STYLE}'>-{number}: {content}</span>")
        }
    }
}

/// Escape the five characters that are significant in HTML text and
/// attribute values.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
