//! System prompts for LLM-based text transformation.
//!
//! Callers can override these via [`crate::config::ReaderConfig::system_prompt`];
//! the constants are used only when no override is provided.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the AI collaborator should do with the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformKind {
    /// Tighten the text for RSVP without dropping content.
    Refine,
    /// Reduce the text to its essential points.
    Summarize,
}

impl TransformKind {
    pub fn default_prompt(self) -> &'static str {
        match self {
            TransformKind::Refine => REFINE_PROMPT,
            TransformKind::Summarize => SUMMARIZE_PROMPT,
        }
    }

    /// Status line shown while the transformation runs.
    pub fn progress_label(self) -> &'static str {
        match self {
            TransformKind::Refine => "Refining text for speed reading...",
            TransformKind::Summarize => "Summarizing text...",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::Refine => f.write_str("refine"),
            TransformKind::Summarize => f.write_str("summarize"),
        }
    }
}

pub const REFINE_PROMPT: &str = r#"You are a text optimization expert. Refine the text supplied by the user for speed reading (RSVP), where it will be shown one word at a time.

- Simplify complex sentence structures.
- Remove redundant filler words.
- Ensure high information density.
- Maintain the original meaning and tone.
- Return ONLY the optimized text: no preamble, no commentary, no Markdown fences."#;

pub const SUMMARIZE_PROMPT: &str = r#"Summarize the text supplied by the user into a concise version suitable for rapid reading, where it will be shown one word at a time.

- Keep only the essential points and narratives.
- Write plain prose sentences; avoid lists, headings and tables.
- Return ONLY the summary: no preamble, no commentary, no Markdown fences."#;

/// Wrap the source text as the user turn.
pub fn user_message(text: &str) -> String {
    format!("TEXT:\n{text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_its_prompt() {
        assert!(TransformKind::Refine.default_prompt().contains("speed reading"));
        assert!(TransformKind::Summarize.default_prompt().contains("Summarize"));
    }

    #[test]
    fn prompts_forbid_fences() {
        for kind in [TransformKind::Refine, TransformKind::Summarize] {
            assert!(kind.default_prompt().contains("no Markdown fences"));
        }
    }

    #[test]
    fn user_message_carries_text() {
        assert_eq!(user_message("abc"), "TEXT:\nabc");
    }
}
