//! Medication inventory: validation at the storage boundary and stores.
//!
//! Nothing a client sends is trusted. Text fields are trimmed and length
//! checked, and the expiry date is normalized again with the same rules the
//! label parser uses, so a record is only stored with a canonical date.

mod memory;
#[cfg(feature = "native")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "native")]
pub use sqlite::SqliteStore;

use std::cmp::Ordering;
use std::ops::RangeInclusive;

use tracing::info;

use crate::error::{StoreError, ValidationError};
use crate::label::rules::dates::normalize_date;
use crate::label::text::trim_label;
use crate::models::medication::{Medication, MedicationDraft, NewMedication};

/// Allowed length of a medication name, in characters.
pub const NAME_LENGTH: RangeInclusive<usize> = 2..=120;
/// Allowed length of a manufacturer.
pub const MANUFACTURER_LENGTH: RangeInclusive<usize> = 2..=120;
/// Allowed length of an active ingredient.
pub const ACTIVE_INGREDIENT_LENGTH: RangeInclusive<usize> = 2..=160;

/// Storage for inventory entries.
pub trait MedicationStore {
    /// All entries, soonest expiry first; newest first on equal expiry.
    fn list(&self) -> Result<Vec<Medication>, StoreError>;

    /// Store a validated medication and return the stored entry.
    fn create(&mut self, medication: NewMedication) -> Result<Medication, StoreError>;

    /// Remove an entry. Fails with [`StoreError::NotFound`] if there is none.
    fn delete(&mut self, id: i64) -> Result<(), StoreError>;
}

/// Validate a submitted medication.
///
/// Fields are checked in form order and the first failure rejects the
/// whole record.
pub fn validate(draft: &MedicationDraft) -> Result<NewMedication, ValidationError> {
    let name = checked_text(&draft.name, "name", NAME_LENGTH)?;
    let manufacturer = checked_text(&draft.manufacturer, "manufacturer", MANUFACTURER_LENGTH)?;
    let active_ingredient = checked_text(
        &draft.active_ingredient,
        "activeIngredient",
        ACTIVE_INGREDIENT_LENGTH,
    )?;
    let expiry_date =
        normalize_date(&draft.expiry_date).ok_or(ValidationError::ExpiryDate)?;

    Ok(NewMedication {
        name,
        manufacturer,
        active_ingredient,
        expiry_date,
    })
}

/// Validate a JSON request body.
pub fn validate_json(body: &str) -> Result<NewMedication, ValidationError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ValidationError::Payload(e.to_string()))?;

    let draft = match value {
        serde_json::Value::Null => {
            return Err(ValidationError::Payload("empty body".to_string()));
        }
        serde_json::Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| ValidationError::Payload(e.to_string()))?,
        _ => MedicationDraft::default(),
    };

    validate(&draft)
}

/// Validate a draft and store it.
pub fn submit<S: MedicationStore + ?Sized>(
    store: &mut S,
    draft: &MedicationDraft,
) -> crate::Result<Medication> {
    let medication = validate(draft)?;
    let stored = store.create(medication)?;
    info!("Stored medication {} ({})", stored.id, stored.name);
    Ok(stored)
}

/// Parse a medication id from a path segment; only positive integers.
pub fn parse_medication_id(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id >= 1)
}

fn checked_text(
    value: &str,
    field: &'static str,
    allowed: RangeInclusive<usize>,
) -> Result<String, ValidationError> {
    let value = trim_label(value);
    if !allowed.contains(&value.chars().count()) {
        return Err(ValidationError::Length {
            field,
            min: *allowed.start(),
            max: *allowed.end(),
        });
    }
    Ok(value.to_string())
}

/// Inventory listing order.
pub(crate) fn listing_order(a: &Medication, b: &Medication) -> Ordering {
    a.expiry_date
        .cmp(&b.expiry_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}
