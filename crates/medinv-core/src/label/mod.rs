//! Medication label field extraction.

mod parser;
pub mod rules;
pub mod text;

pub use parser::{ExtractionResult, FieldSource, LabelParser, ScanOutcome};
pub use text::{compact, trim_label, LabelText};

use crate::models::medication::ExtractedFields;

/// Trait for label field extractors.
///
/// Extraction never fails; fields that cannot be found stay empty.
pub trait LabelExtractor {
    /// Extract form fields from recognized text.
    fn extract(&self, text: &str) -> ExtractedFields;
}
