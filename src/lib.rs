use error_set::error_set;

pub mod diff;
pub mod input;
pub mod parse;
pub mod prompt;
pub mod render;

pub use diff::{EditOp, EditScript, compute_edit_script};
pub use input::{InputError, TextInput};
pub use parse::{ScriptParseError, parse_ndiff};
pub use prompt::{AnalysisModel, DEFAULT_INSTRUCTIONS, ModelError, build_prompt};
pub use render::{LineCounters, RenderOptions, render};

error_set! {
    /// Top-level error for seodiff operations
    SeoDiffError := {
        InputError(InputError),
        ScriptParseError(ScriptParseError),
        ModelError(ModelError),
    } || IoError

    /// Errors reading page content from disk
    IoError := {
        #[display("Failed to read {path}: {message}")]
        ReadFailed { path: String, message: String },
        #[display("Only one input can be read from stdin")]
        StdinTwice,
    }
}

/// Two versions of a page, held by the caller between renders.
///
/// # Examples
///
/// ```
/// use seodiff::{Comparison, RenderOptions, TextInput, render};
///
/// let comparison = Comparison::new(
///     TextInput::from("<title>Old</title>\n"),
///     TextInput::from("<title>New</title>\n"),
/// );
/// let script = comparison.script().unwrap();
/// assert_eq!(
///     render(&script, &RenderOptions::machine()),
///     "-1: <title>Old</title>\n+1: <title>New</title>"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    before: TextInput,
    after: TextInput,
}

impl Comparison {
    pub fn new(before: TextInput, after: TextInput) -> Self {
        Self { before, after }
    }

    pub fn before(&self) -> &TextInput {
        &self.before
    }

    pub fn after(&self) -> &TextInput {
        &self.after
    }

    /// Diff the two versions.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MismatchedInputs`] if one side is a document and
    /// the other a sentence list.
    pub fn script(&self) -> Result<EditScript, InputError> {
        let (before, after) = input::units(&self.before, &self.after)?;
        Ok(compute_edit_script(&before, &after))
    }

    /// Diff and render in one step.
    pub fn render(&self, options: &RenderOptions) -> Result<String, InputError> {
        Ok(render(&self.script()?, options))
    }

    /// Diff and build the summary prompt in one step.
    pub fn prompt(&self, instructions: &str, only_changes: bool) -> Result<String, InputError> {
        Ok(build_prompt(instructions, &self.script()?, only_changes))
    }
}
