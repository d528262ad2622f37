//! Medication records, from label scan to stored inventory entry.

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::label::rules::Field;
use crate::label::rules::dates::{format_canonical, normalize_date};

/// Fields recovered from a label scan.
///
/// Every field is a best guess and may be absent. `expiry_date` is only
/// ever set to a date that passed normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_ingredient: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "canonical_date"
    )]
    pub expiry_date: Option<NaiveDate>,
}

/// Accept only canonical `YYYY-MM-DD` dates that the normalizer agrees with.
fn canonical_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    normalize_date(&raw)
        .filter(|date| format_canonical(date) == raw)
        .map(Some)
        .ok_or_else(|| D::Error::custom(format!("{:?} is not a canonical date", raw)))
}

impl ExtractedFields {
    /// Value of a field as it would be written into the form.
    pub fn get(&self, field: Field) -> Option<String> {
        match field {
            Field::Name => self.name.clone(),
            Field::Manufacturer => self.manufacturer.clone(),
            Field::ActiveIngredient => self.active_ingredient.clone(),
            Field::ExpiryDate => self.expiry_date.as_ref().map(format_canonical),
        }
    }

    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        Field::ALL
            .iter()
            .filter(|field| self.get(**field).is_some())
            .count()
    }

    /// True when nothing was found.
    pub fn is_empty(&self) -> bool {
        self.found_count() == 0
    }
}

/// A medication as submitted by a client, before validation.
///
/// Mirrors the JSON body of a create request. Values that are not JSON
/// strings are read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDraft {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub manufacturer: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub active_ingredient: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub expiry_date: String,
}

impl From<&ExtractedFields> for MedicationDraft {
    fn from(fields: &ExtractedFields) -> Self {
        Self {
            name: fields.get(Field::Name).unwrap_or_default(),
            manufacturer: fields.get(Field::Manufacturer).unwrap_or_default(),
            active_ingredient: fields.get(Field::ActiveIngredient).unwrap_or_default(),
            expiry_date: fields.get(Field::ExpiryDate).unwrap_or_default(),
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => text,
        _ => String::new(),
    })
}

/// A validated medication, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedication {
    pub name: String,
    pub manufacturer: String,
    pub active_ingredient: String,
    pub expiry_date: NaiveDate,
}

/// A stored inventory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
    pub active_ingredient: String,
    pub expiry_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl Medication {
    /// Expiry status relative to `today`.
    pub fn status(&self, today: NaiveDate, warn_within_days: i64) -> ExpiryStatus {
        ExpiryStatus::evaluate(self.expiry_date, today, warn_within_days)
    }
}

/// Default warning window before expiry, in days.
pub const DEFAULT_WARN_WITHIN_DAYS: i64 = 60;

/// How close a medication is to its expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpiryStatus {
    /// The expiry date has passed.
    Expired { days: i64 },
    /// Expires within the warning window (today included).
    ExpiringSoon { days: i64 },
    Ok { days: i64 },
}

impl ExpiryStatus {
    pub fn evaluate(expiry: NaiveDate, today: NaiveDate, warn_within_days: i64) -> Self {
        let days = (expiry - today).num_days();
        if days < 0 {
            Self::Expired { days }
        } else if days <= warn_within_days {
            Self::ExpiringSoon { days }
        } else {
            Self::Ok { days }
        }
    }

    /// Days until expiry; negative once expired.
    pub fn days(&self) -> i64 {
        match self {
            Self::Expired { days } | Self::ExpiringSoon { days } | Self::Ok { days } => *days,
        }
    }

    /// Short badge text.
    pub fn label(&self) -> String {
        match self {
            Self::Expired { .. } => "expired".to_string(),
            Self::ExpiringSoon { days } | Self::Ok { days } => format!("{} days", days),
        }
    }
}
