//! Deterministic cleanup of collaborator text before segmentation.
//!
//! PDF text layers carry soft hyphens, zero-width joiners and ragged line
//! breaks; LLMs occasionally wrap their answer in a code fence despite the
//! prompt. Both are fixed here so the segmenter only ever sees single-spaced
//! plain words.

use once_cell::sync::Lazy;
use regex::Regex;

/// Extracted document text → reader-ready text.
///
/// 1. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
/// 2. Collapse every whitespace run to a single space and trim
pub fn clean_extracted(input: &str) -> String {
    let s = remove_invisible_chars(input);
    collapse_whitespace(&s)
}

/// LLM answer → reader-ready text.
///
/// 1. Strip outer Markdown fences
/// 2. Strip invisible Unicode
/// 3. Collapse whitespace
pub fn clean_transformed(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = remove_invisible_chars(&s);
    collapse_whitespace(&s)
}

// ── Whitespace ───────────────────────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input.trim(), " ").into_owned()
}

// ── Invisible characters ─────────────────────────────────────────────────────

pub fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Outer fences ─────────────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\r?\n(.*)\r?\n```\s*$").unwrap());

pub fn strip_outer_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_runs_and_trim() {
        assert_eq!(collapse_whitespace("  a \n\n b\t\tc  "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn collapse_handles_unicode_spaces() {
        assert_eq!(collapse_whitespace("a\u{00A0}\u{2003}b"), "a b");
    }

    #[test]
    fn remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn strip_fences_with_and_without_lang() {
        assert_eq!(strip_outer_fences("```text\nHello there\n```"), "Hello there");
        assert_eq!(strip_outer_fences("```\nHello\nthere\n```\n"), "Hello\nthere");
        assert_eq!(strip_outer_fences("No fences here"), "No fences here");
    }

    #[test]
    fn inner_fences_untouched() {
        let input = "Intro ```code``` outro";
        assert_eq!(strip_outer_fences(input), input);
    }

    #[test]
    fn clean_extracted_pipeline() {
        let page_text = "Speed   read\u{00AD}ing\r\n is a set\u{200B} of\n\ntechniques. ";
        assert_eq!(
            clean_extracted(page_text),
            "Speed reading is a set of techniques."
        );
    }

    #[test]
    fn clean_transformed_pipeline() {
        let answer = "```markdown\nRSVP shows one word\n\nat a time.\n```";
        assert_eq!(clean_transformed(answer), "RSVP shows one word at a time.");
    }
}
