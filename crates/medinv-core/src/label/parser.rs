//! Label parser that runs the field rule table over recognized text.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::medication::ExtractedFields;

use super::rules::{dates::normalize_date, rules_for, Field};
use super::text::{compact, LabelText};
use super::LabelExtractor;

/// Which rule produced a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSource {
    pub field: Field,
    pub rule: &'static str,
}

/// Result of a label scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Extracted form fields.
    pub fields: ExtractedFields,
    /// Recognized text the fields came from.
    pub raw_text: String,
    /// Rule that filled each found field.
    pub sources: Vec<FieldSource>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    pub fn outcome(&self) -> ScanOutcome {
        match self.fields.found_count() {
            0 => ScanOutcome::NothingFound,
            n => ScanOutcome::Prefilled(n),
        }
    }

    /// Rule that filled `field`, if any.
    pub fn source_of(&self, field: Field) -> Option<&'static str> {
        self.sources
            .iter()
            .find(|source| source.field == field)
            .map(|source| source.rule)
    }
}

/// What the user is told after a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// This many fields were pre-filled.
    Prefilled(usize),
    NothingFound,
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOutcome::Prefilled(n) => write!(
                f,
                "{} field(s) pre-filled, please review before saving",
                n
            ),
            ScanOutcome::NothingFound => f.write_str(
                "text recognized but no clear fields found, please fill in manually",
            ),
        }
    }
}

/// Rule-based medication label parser.
#[derive(Debug, Clone)]
pub struct LabelParser {
    /// Trimmed lines shorter than this are ignored.
    min_line_length: usize,
    /// Longest line accepted as a product name.
    max_name_length: usize,
}

impl LabelParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            min_line_length: config.min_line_length,
            max_name_length: config.max_name_length,
        }
    }

    /// Set the minimum line length.
    pub fn with_min_line_length(mut self, length: usize) -> Self {
        self.min_line_length = length;
        self
    }

    /// Set the maximum product name length.
    pub fn with_max_name_length(mut self, length: usize) -> Self {
        self.max_name_length = length;
        self
    }

    /// Parse recognized label text.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let label = LabelText::new(text, self.min_line_length, self.max_name_length);
        let mut fields = ExtractedFields::default();
        let mut sources = Vec::new();
        let mut warnings = Vec::new();

        for field in [Field::ActiveIngredient, Field::Manufacturer, Field::Name] {
            if let Some((value, rule)) = self.resolve_text(field, &label) {
                debug!("{} from rule {}: {:?}", field, rule, value);
                match field {
                    Field::ActiveIngredient => fields.active_ingredient = Some(value),
                    Field::Manufacturer => fields.manufacturer = Some(value),
                    _ => fields.name = Some(value),
                }
                sources.push(FieldSource { field, rule });
            }
        }

        if let Some((date, rule)) = self.resolve_expiry(&label, &mut warnings) {
            debug!("{} from rule {}: {}", Field::ExpiryDate, rule, date);
            fields.expiry_date = Some(date);
            sources.push(FieldSource {
                field: Field::ExpiryDate,
                rule,
            });
        }

        debug!(
            "Extracted {} of {} fields from {} lines",
            fields.found_count(),
            Field::ALL.len(),
            label.lines().len()
        );

        ExtractionResult {
            fields,
            raw_text: text.to_string(),
            sources,
            warnings,
        }
    }

    /// First rule yielding a non-empty compacted value wins.
    fn resolve_text(&self, field: Field, label: &LabelText) -> Option<(String, &'static str)> {
        rules_for(field).find_map(|rule| {
            rule.candidate(label)
                .map(|raw| compact(&raw))
                .filter(|value| !value.is_empty())
                .map(|value| (value, rule.name))
        })
    }

    /// The first token found is final; a labelled token that does not
    /// normalize leaves the field empty.
    fn resolve_expiry(
        &self,
        label: &LabelText,
        warnings: &mut Vec<String>,
    ) -> Option<(NaiveDate, &'static str)> {
        let (token, rule) = rules_for(Field::ExpiryDate)
            .find_map(|rule| rule.candidate(label).map(|token| (token, rule.name)))?;

        match normalize_date(&token) {
            Some(date) => Some((date, rule)),
            None => {
                warnings.push(format!("expiry token '{}' is not a valid date", token));
                None
            }
        }
    }
}

impl Default for LabelParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelExtractor for LabelParser {
    fn extract(&self, text: &str) -> ExtractedFields {
        self.parse(text).fields
    }
}
