//! Preprocessing of recognized label text.

use super::rules::patterns::WHITESPACE_RUN;

/// Whitespace as label text sees it: Unicode white space plus the
/// zero-width no-break space (`U+FEFF`) that byte-order marks leave behind.
pub fn is_label_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Trim label whitespace from both ends.
pub fn trim_label(value: &str) -> &str {
    value.trim_matches(is_label_space)
}

/// Collapse whitespace runs to a single space and trim.
pub fn compact(value: &str) -> String {
    trim_label(&WHITESPACE_RUN.replace_all(value, " ")).to_string()
}

/// Recognized text prepared for rule matching.
///
/// Keeps the whole text (carriage returns turned into line breaks) for
/// pattern searches across lines, a lowercased copy, and the trimmed lines
/// that are long enough to carry a value.
#[derive(Debug, Clone)]
pub struct LabelText {
    text: String,
    lower: String,
    lines: Vec<String>,
    max_name_length: usize,
}

impl LabelText {
    pub fn new(raw: &str, min_line_length: usize, max_name_length: usize) -> Self {
        let text = raw.replace('\r', "\n");
        let lines = text
            .split('\n')
            .map(trim_label)
            .filter(|line| line.chars().count() >= min_line_length)
            .map(str::to_string)
            .collect();
        let lower = text.to_lowercase();

        Self {
            text,
            lower,
            lines,
            max_name_length,
        }
    }

    /// Full text with line breaks normalized.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased full text.
    pub fn lower(&self) -> &str {
        &self.lower
    }

    /// Trimmed candidate lines, in reading order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Longest line accepted as a product name.
    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }
}
