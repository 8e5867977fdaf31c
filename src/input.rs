//! The two shapes a page can arrive in before it is diffed.
//!
//! Whole-document parts (the full page, its `<head>` or its `<body>`) arrive
//! as one blob and are split into lines that keep their terminators.
//! Extracted article text arrives already tokenized into sentences, which are
//! diffed as-is.
//!
//! # Examples
//!
//! ```
//! use seodiff::input::{TextInput, split_lines};
//!
//! assert_eq!(split_lines("a\nb\r\nc"), vec!["a\n", "b\r\n", "c"]);
//!
//! let doc = TextInput::from_bytes(b"<head>\n</head>\n").unwrap();
//! assert_eq!(doc.units(), vec!["<head>\n", "</head>\n"]);
//! ```

use error_set::error_set;

error_set! {
    /// Errors from turning raw page content into diffable units
    InputError := {
        /// Raw bytes are not valid UTF-8
        #[display("Input is not valid UTF-8: {message}")]
        EncodingError { message: String },
        /// One side is a whole document and the other a sentence list
        #[display("Cannot diff a document against a sentence list")]
        MismatchedInputs,
    }
}

/// Text supplied for one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInput {
    /// A whole blob, split into lines on demand
    Document(String),
    /// Pre-tokenized sentences, each one a unit
    Sentences(Vec<String>),
}

impl TextInput {
    /// Decode a fetched page body.
    ///
    /// Invalid UTF-8 is rejected rather than replaced, since a lossy decode
    /// would shift content under the line numbers shown to the reader.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InputError> {
        decode(bytes).map(TextInput::Document)
    }

    /// Borrow the units this input is diffed as.
    pub fn units(&self) -> Vec<&str> {
        match self {
            TextInput::Document(text) => split_lines(text),
            TextInput::Sentences(sentences) => sentences.iter().map(String::as_str).collect(),
        }
    }

    fn is_document(&self) -> bool {
        matches!(self, TextInput::Document(_))
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::Document(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        TextInput::Document(text)
    }
}

impl From<Vec<String>> for TextInput {
    fn from(sentences: Vec<String>) -> Self {
        TextInput::Sentences(sentences)
    }
}

/// Decode raw page bytes as UTF-8.
pub fn decode(bytes: &[u8]) -> Result<String, InputError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| InputError::EncodingError {
            message: e.to_string(),
        })
}

/// Split both sides of a comparison into units.
///
/// # Errors
///
/// Returns [`InputError::MismatchedInputs`] when one side is a document and
/// the other a sentence list.
pub fn units<'a>(
    before: &'a TextInput,
    after: &'a TextInput,
) -> Result<(Vec<&'a str>, Vec<&'a str>), InputError> {
    if before.is_document() != after.is_document() {
        return Err(InputError::MismatchedInputs);
    }
    Ok((before.units(), after.units()))
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Drop the terminator [`split_lines`] left on a line, if any.
pub fn strip_terminator(line: &str) -> &str {
    match line.strip_suffix("\r\n") {
        Some(stripped) => stripped,
        None => line.strip_suffix(is_line_break).unwrap_or(line),
    }
}

/// Split text into lines, keeping each line's terminator.
///
/// `\r\n` counts as a single terminator. The vertical tab, form feed, file,
/// group and record separators, NEL and the Unicode line and paragraph
/// separators also end a line. No empty trailing unit is produced.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let end = match ch {
            '\r' => match chars.peek() {
                Some(&(next_idx, '\n')) => {
                    chars.next();
                    next_idx + 1
                }
                _ => idx + 1,
            },
            ch if is_line_break(ch) => idx + ch.len_utf8(),
            _ => continue,
        };
        lines.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}
