//! Word segmentation and pivot (Optimal Recognition Point) alignment.
//!
//! Every token is split into `prefix | pivot | suffix` so the display can pin
//! the pivot character to a fixed column. Lengths are counted in `char`s; a
//! token is never cut inside a code point.

use serde::Serialize;

/// One token ready for display. Immutable once built by [`segment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordRecord {
    text: String,
    prefix: String,
    pivot: String,
    suffix: String,
}

impl WordRecord {
    /// Decompose a single non-empty token. Returns `None` for an empty string.
    pub fn new(token: &str) -> Option<Self> {
        let len = token.chars().count();
        if len == 0 {
            return None;
        }
        let idx = pivot_index(len);

        // Byte offsets of the pivot char and the char after it.
        let mut offsets = token.char_indices().map(|(i, _)| i).skip(idx);
        let start = offsets.next()?;
        let end = offsets.next().unwrap_or(token.len());

        Some(Self {
            text: token.to_string(),
            prefix: token[..start].to_string(),
            pivot: token[start..end].to_string(),
            suffix: token[end..].to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn pivot(&self) -> &str {
        &self.pivot
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Char index of the pivot within `text`.
    pub fn pivot_index(&self) -> usize {
        self.prefix.chars().count()
    }

    /// Last character of the token, used for punctuation pacing.
    pub fn last_char(&self) -> Option<char> {
        self.text.chars().next_back()
    }
}

/// Pivot position for a token of `len` chars.
///
/// | length | pivot |
/// |--------|-------|
/// | 1      | 0     |
/// | 2–5    | 1     |
/// | 6–9    | 2     |
/// | 10–13  | 3     |
/// | ≥ 14   | 4     |
pub fn pivot_index(len: usize) -> usize {
    match len {
        0 | 1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    }
}

/// Split `text` on whitespace runs and decompose each token.
///
/// Total over all inputs: empty or whitespace-only text yields an empty vec.
pub fn segment(text: &str) -> Vec<WordRecord> {
    text.split_whitespace().filter_map(WordRecord::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuilt(w: &WordRecord) -> String {
        format!("{}{}{}", w.prefix(), w.pivot(), w.suffix())
    }

    #[test]
    fn pivot_boundaries_are_exact() {
        let cases = [(1, 0), (5, 1), (6, 2), (9, 2), (10, 3), (13, 3), (14, 4)];
        for (len, expected) in cases {
            let token = "x".repeat(len);
            let words = segment(&token);
            assert_eq!(words.len(), 1);
            assert_eq!(words[0].pivot_index(), expected, "length {len}");
        }
    }

    #[test]
    fn empty_and_blank_input() {
        assert!(segment("").is_empty());
        assert!(segment("   ").is_empty());
        assert!(segment("\n\t \r\n").is_empty());
    }

    #[test]
    fn decomposition_rebuilds_token() {
        let tokens = [
            "a", "I.", "...", "—", "reading", "Presentation", "comprehension,",
            "internationalization", "naïve", "日本語のテキスト", "(RSVP)", "'pivot'",
        ];
        for t in tokens {
            let words = segment(t);
            assert_eq!(words.len(), 1, "token {t:?}");
            let w = &words[0];
            assert_eq!(w.text(), t);
            assert_eq!(rebuilt(w), t);
            assert_eq!(w.pivot().chars().count(), 1, "token {t:?}");
        }
    }

    #[test]
    fn splits_on_whitespace_runs() {
        let words = segment("  Hi.   There,\n\tworld  ");
        let texts: Vec<&str> = words.iter().map(WordRecord::text).collect();
        assert_eq!(texts, ["Hi.", "There,", "world"]);
    }

    #[test]
    fn known_decompositions() {
        let w = WordRecord::new("reading").unwrap();
        assert_eq!((w.prefix(), w.pivot(), w.suffix()), ("re", "a", "ding"));

        let w = WordRecord::new("a").unwrap();
        assert_eq!((w.prefix(), w.pivot(), w.suffix()), ("", "a", ""));

        let w = WordRecord::new("naïve").unwrap();
        assert_eq!((w.prefix(), w.pivot(), w.suffix()), ("n", "a", "ïve"));

        let w = WordRecord::new("été").unwrap();
        assert_eq!(w.pivot(), "t");
    }

    #[test]
    fn empty_token_has_no_record() {
        assert!(WordRecord::new("").is_none());
    }

    #[test]
    fn same_input_same_output() {
        let text = "Speed reading is a set of techniques.";
        assert_eq!(segment(text), segment(text));
    }
}
