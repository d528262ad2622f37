//! Core library for the personal medication inventory.
//!
//! This crate provides:
//! - Expiry date normalization to canonical `YYYY-MM-DD` dates
//! - Rule-based extraction of name, manufacturer, active ingredient and
//!   expiry date from OCR'd package text (German and English labels)
//! - Validation of submitted records at the storage boundary
//! - Inventory stores (in-memory, and SQLite with the `native` feature)

pub mod error;
pub mod inventory;
pub mod label;
pub mod models;

pub use error::{MedinvError, Result, StoreError, ValidationError};
pub use inventory::{validate, MedicationStore, MemoryStore};
#[cfg(feature = "native")]
pub use inventory::SqliteStore;
pub use label::rules::{normalize_date, normalize_date_str, DateNormalizer, Field};
pub use label::{ExtractionResult, LabelExtractor, LabelParser, ScanOutcome};
pub use models::config::MedinvConfig;
pub use models::medication::{
    ExpiryStatus, ExtractedFields, Medication, MedicationDraft, NewMedication,
};
