//! Parsing ndiff-formatted text back into an [`EditScript`].
//!
//! This is the format [`EditScript`]'s `Display` produces, and the one
//! difflib-style `ndiff` tools print: every record is a two-character tag
//! followed by the unit's text.
//!
//! # Record tags
//!
//! - `"  "` - unit unchanged on both sides
//! - `"- "` - unit only in the "before" text
//! - `"+ "` - unit only in the "after" text
//! - `"? "` - intraline hint for the record above it; carries no unit and is skipped
//! - `"\\ "` - the unit above had no terminator; the `\n` that ended its record
//!   is not part of it
//!
//! Records end after a `\n` (which stays part of the unit) or at end of input.
//!
//! # Examples
//!
//! ```
//! use seodiff::diff::EditOp;
//! use seodiff::parse::parse_ndiff;
//!
//! let script = parse_ndiff("  <head>\n- <title>Old</title>\n? ^^^\n+ <title>New</title>\n").unwrap();
//! assert_eq!(script.ops, vec![
//!     EditOp::Equal("<head>\n".into()),
//!     EditOp::Delete("<title>Old</title>\n".into()),
//!     EditOp::Insert("<title>New</title>\n".into()),
//! ]);
//! ```

use crate::diff::{EditOp, EditScript};
use error_set::error_set;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::char,
    combinator::{opt, recognize, value},
};

error_set! {
    /// Errors from parsing ndiff-formatted text
    ScriptParseError := {
        /// A record starts with something other than a known two-character tag
        #[display("Malformed op on line {line}: unrecognized tag '{tag}'")]
        MalformedOp { line: usize, tag: String },
        /// A no-newline marker that does not follow a newline-terminated unit
        #[display("No-newline marker on line {line} does not follow a unit")]
        MisplacedMarker { line: usize },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Equal,
    Delete,
    Insert,
    Hint,
    NoNewline,
}

fn record_kind(input: &str) -> IResult<&str, RecordKind> {
    alt((
        value(RecordKind::Equal, tag("  ")),
        value(RecordKind::Delete, tag("- ")),
        value(RecordKind::Insert, tag("+ ")),
        value(RecordKind::Hint, tag("? ")),
        value(RecordKind::NoNewline, tag("\\ ")),
    ))
    .parse(input)
}

/// Rest of the line, terminator included
fn record_body(input: &str) -> IResult<&str, &str> {
    recognize((take_till(|c| c == '\n'), opt(char('\n')))).parse(input)
}

fn record(input: &str) -> IResult<&str, (RecordKind, &str)> {
    (record_kind, record_body).parse(input)
}

/// Parse ndiff-formatted text into an edit script.
///
/// # Errors
///
/// Returns [`ScriptParseError::MalformedOp`] naming the 1-based record
/// number of the first record without a recognized tag, and
/// [`ScriptParseError::MisplacedMarker`] for a no-newline marker with no
/// terminated unit before it.
pub fn parse_ndiff(text: &str) -> Result<EditScript, ScriptParseError> {
    let mut ops = Vec::new();
    let mut rest = text;
    let mut line = 0;

    while !rest.is_empty() {
        line += 1;
        let (next, (kind, content)) =
            record(rest).map_err(|_| ScriptParseError::MalformedOp {
                line,
                tag: rest.chars().take(2).collect::<String>().escape_debug().to_string(),
            })?;

        match kind {
            RecordKind::Equal => ops.push(EditOp::Equal(content.to_string())),
            RecordKind::Delete => ops.push(EditOp::Delete(content.to_string())),
            RecordKind::Insert => ops.push(EditOp::Insert(content.to_string())),
            RecordKind::Hint => {}
            RecordKind::NoNewline => match ops.last_mut() {
                Some(EditOp::Equal(unit) | EditOp::Insert(unit) | EditOp::Delete(unit))
                    if unit.ends_with('\n') =>
                {
                    unit.pop();
                }
                _ => return Err(ScriptParseError::MisplacedMarker { line }),
            },
        }
        rest = next;
    }

    tracing::debug!(records = line, ops = ops.len(), "parsed ndiff script");
    Ok(EditScript::new(ops))
}
