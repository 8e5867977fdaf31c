//! Building the instruction prompt for an SEO summary of a diff.
//!
//! The prompt is plain text: instructions, a blank line, then the
//! machine-mode rendering of the diff. Sending it to a model is left to the
//! caller.

use crate::diff::EditScript;
use crate::render::{RenderOptions, render};
use error_set::error_set;
use std::fmt;
use std::str::FromStr;

/// Instructions used when the caller supplies none
pub const DEFAULT_INSTRUCTIONS: &str = "Analyze the changes as specified from the output of a line-by-line diff, taking into account the included line numbers. A '-' before a line means it was removed. A '+' before a line means it was added. Make sure to note anything that may impact SEO such as canonical, hreflang, schema, links, or content changes. Summarize the results.";

error_set! {
    /// Errors from choosing an analysis model
    ModelError := {
        #[display("Unknown model '{name}'")]
        UnknownModel { name: String },
    }
}

/// Models a summary can be requested from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisModel {
    /// Long-context default
    #[default]
    Gpt35Turbo16k,
    Gpt4_32k,
    Gpt4Turbo,
    Gpt4_1106Preview,
}

impl AnalysisModel {
    pub const ALL: [AnalysisModel; 4] = [
        AnalysisModel::Gpt35Turbo16k,
        AnalysisModel::Gpt4_32k,
        AnalysisModel::Gpt4Turbo,
        AnalysisModel::Gpt4_1106Preview,
    ];

    /// Identifier the model endpoint expects
    pub fn id(self) -> &'static str {
        match self {
            AnalysisModel::Gpt35Turbo16k => "gpt-3.5-turbo-16k",
            AnalysisModel::Gpt4_32k => "gpt-4-32k",
            AnalysisModel::Gpt4Turbo => "gpt-4-turbo",
            AnalysisModel::Gpt4_1106Preview => "gpt-4-1106-preview",
        }
    }
}

impl fmt::Display for AnalysisModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AnalysisModel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisModel::ALL
            .into_iter()
            .find(|model| model.id() == s)
            .ok_or_else(|| ModelError::UnknownModel {
                name: s.to_string(),
            })
    }
}

/// Instructions followed by a blank line and the prompt-ready diff.
///
/// The diff is rendered with [`RenderOptions::machine`], so line numbers in
/// the prompt match the inputs even when `only_changes` hides context.
pub fn build_prompt(instructions: &str, script: &EditScript, only_changes: bool) -> String {
    let diff = render(script, &RenderOptions::machine().only_changes(only_changes));
    format!("{}\n\n{}", instructions.trim_end(), diff)
}
