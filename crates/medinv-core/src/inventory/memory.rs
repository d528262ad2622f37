//! In-memory inventory store.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use tracing::debug;

use super::{listing_order, MedicationStore};
use crate::error::StoreError;
use crate::models::medication::{Medication, NewMedication};

/// Inventory kept in memory for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    items: Vec<Medication>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Store with a fixed creation time.
    pub fn create_at(
        &mut self,
        medication: NewMedication,
        created_at: NaiveDateTime,
    ) -> Medication {
        let entry = Medication {
            id: self.next_id,
            name: medication.name,
            manufacturer: medication.manufacturer,
            active_ingredient: medication.active_ingredient,
            expiry_date: medication.expiry_date,
            created_at,
        };
        self.next_id += 1;
        self.items.push(entry.clone());
        debug!("Created in-memory medication {}", entry.id);
        entry
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationStore for MemoryStore {
    fn list(&self) -> Result<Vec<Medication>, StoreError> {
        let mut items = self.items.clone();
        items.sort_by(listing_order);
        Ok(items)
    }

    fn create(&mut self, medication: NewMedication) -> Result<Medication, StoreError> {
        let now = Utc::now().naive_utc().trunc_subsecs(0);
        Ok(self.create_at(medication, now))
    }

    fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
