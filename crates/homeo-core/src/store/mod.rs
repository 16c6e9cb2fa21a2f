//! In-memory medicine store.
//!
//! The store owns the canonical collection. Every operation runs under one
//! lock and hands out clones, so callers can never observe or corrupt a
//! half-written record. Nothing is persisted; a new store starts empty.

mod ids;

pub use ids::new_medicine_id;

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::debug;

use crate::models::{Medicine, MedicineInput, MedicinePatch};
use crate::search::SearchFilter;

/// Store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Medicine not found: {0}")]
    NotFound(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Process-local medicine collection, kept in insertion order.
#[derive(Debug, Default)]
pub struct MedicineStore {
    records: Mutex<Vec<Medicine>>,
}

impl MedicineStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> StoreResult<MutexGuard<'_, Vec<Medicine>>> {
        self.records.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// All records, in insertion order.
    pub fn list(&self) -> StoreResult<Vec<Medicine>> {
        Ok(self.records()?.clone())
    }

    pub fn get_by_id(&self, id: &str) -> StoreResult<Option<Medicine>> {
        Ok(self.records()?.iter().find(|m| m.id == id).cloned())
    }

    /// Add a record with a freshly assigned id.
    pub fn create(&self, input: MedicineInput) -> StoreResult<Medicine> {
        let mut records = self.records()?;
        let mut id = new_medicine_id();
        while records.iter().any(|m| m.id == id) {
            id = new_medicine_id();
        }
        let medicine = Medicine::new(id, input);
        records.push(medicine.clone());
        debug!(id = %medicine.id, name = %medicine.name, "medicine created");
        Ok(medicine)
    }

    /// Bulk-create records, returning them in input order.
    pub fn seed(&self, inputs: impl IntoIterator<Item = MedicineInput>) -> StoreResult<Vec<Medicine>> {
        inputs.into_iter().map(|input| self.create(input)).collect()
    }

    /// Merge `patch` into the record with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no record has `id`.
    pub fn update(&self, id: &str, patch: MedicinePatch) -> StoreResult<Medicine> {
        let mut records = self.records()?;
        let medicine = records
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        medicine.apply(patch);
        debug!(id, "medicine updated");
        Ok(medicine.clone())
    }

    /// Remove a record. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut records = self.records()?;
        let before = records.len();
        records.retain(|m| m.id != id);
        let removed = records.len() < before;
        debug!(id, removed, "medicine delete");
        Ok(removed)
    }

    /// Records matching the name and potency queries, in insertion order.
    pub fn search(&self, name_query: Option<&str>, potency_query: Option<&str>) -> StoreResult<Vec<Medicine>> {
        self.search_with(&SearchFilter::new(name_query, potency_query))
    }

    pub fn search_with(&self, filter: &SearchFilter) -> StoreResult<Vec<Medicine>> {
        Ok(self
            .records()?
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    /// Distinct names in first-seen order, for autocomplete.
    pub fn list_unique_names(&self) -> StoreResult<Vec<String>> {
        let records = self.records()?;
        let mut seen = HashSet::new();
        Ok(records
            .iter()
            .filter(|m| seen.insert(m.name.as_str()))
            .map(|m| m.name.clone())
            .collect())
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.records()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.records()?.is_empty())
    }
}
