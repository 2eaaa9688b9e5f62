//! Text cleanup for speech synthesis and slug derivation for file names.

use regex::Regex;

/// Cleans extracted chapter text before it is stored or narrated.
///
/// Paragraph breaks are located before whitespace is collapsed, so the
/// collapse only ever applies inside a paragraph and blank-line runs survive
/// as a single `\n\n`.
pub struct TextNormalizer {
    page_number_line: Regex,
    paragraph_break: Regex,
    whitespace: Regex,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            // A number alone between two line breaks (running page numbers)
            page_number_line: Regex::new(r"\n[ \t]*\d+[ \t]*\r?\n").unwrap(),
            // One or more blank lines
            paragraph_break: Regex::new(r"\n[ \t\r]*\n\s*").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Normalize `raw` text. All-whitespace input yields an empty string;
    /// any other input yields non-empty output.
    pub fn normalize(&self, raw: &str) -> String {
        let without_page_numbers = self.page_number_line.replace_all(raw, "\n");
        let normalized = self.collapse(&without_page_numbers);

        if normalized.is_empty() {
            self.collapse(raw)
        } else {
            normalized
        }
    }

    fn collapse(&self, text: &str) -> String {
        let paragraphs: Vec<String> = self
            .paragraph_break
            .split(text)
            .map(|paragraph| self.whitespace.replace_all(paragraph, " ").trim().to_string())
            .filter(|paragraph| !paragraph.is_empty())
            .collect();

        paragraphs.join("\n\n")
    }
}

/// Number of whitespace-separated tokens in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lower-cased, filename-safe slug: characters other than ASCII letters,
/// digits, whitespace and hyphens are dropped, then runs of whitespace and
/// hyphens become one hyphen.
pub fn slugify(title: &str) -> String {
    let invalid_chars = Regex::new(r"[^a-z0-9\s-]").unwrap();
    let separators = Regex::new(r"[-\s]+").unwrap();

    let lowered = title.to_lowercase();
    let stripped = invalid_chars.replace_all(&lowered, "");
    separators.replace_all(&stripped, "-").to_string()
}

/// Chapter file stem: zero-padded number followed by the title slug.
pub fn chapter_filename(number: usize, title: &str) -> String {
    format!("{:02}-{}", number, slugify(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_runs_become_one_paragraph_break() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("Hello   world\n\n\n\nBye"),
            "Hello world\n\nBye"
        );
    }

    #[test]
    fn single_newlines_collapse_inside_paragraph() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("  The quick\nbrown\tfox  \n\n jumps  "),
            "The quick brown fox\n\njumps"
        );
    }

    #[test]
    fn page_number_lines_are_removed() {
        let normalizer = TextNormalizer::new();
        let raw = "end of a page\n\n  42  \n\nnext page starts\n17\nhere";
        assert_eq!(
            normalizer.normalize(raw),
            "end of a page\n\nnext page starts here"
        );
    }

    #[test]
    fn numbers_at_the_edges_are_kept() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("42"), "42");
        assert_eq!(normalizer.normalize("  1999\n"), "1999");
        assert_eq!(
            normalizer.normalize("1\n\nOnce upon a time"),
            "1\n\nOnce upon a time"
        );
        assert_eq!(normalizer.normalize("The end.\n\n7"), "The end.\n\n7");
    }

    #[test]
    fn numbers_only_text_is_never_emptied() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("\n12\n"), "12");
    }

    #[test]
    fn numbers_inside_sentences_survive() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("It was 1984 and\nthe clocks struck 13."),
            "It was 1984 and the clocks struck 13."
        );
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize(" \n\t\n\n  "), "");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn slug_strips_punctuation_and_joins_words() {
        assert_eq!(slugify("Chapter One: The Beginning!"), "chapter-one-the-beginning");
        assert_eq!(slugify("Rock -- and   Roll"), "rock-and-roll");
        assert_eq!(slugify("Café Society"), "caf-society");
    }

    #[test]
    fn chapter_filename_is_padded() {
        assert_eq!(chapter_filename(3, "Into the Woods"), "03-into-the-woods");
        assert_eq!(chapter_filename(12, "???"), "12-");
    }

    #[test]
    fn word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("one  two\nthree\tfour"), 4);
        assert_eq!(word_count("   "), 0);
    }
}
