//! Name and potency search.
//!
//! Matching rules:
//! - name: case-insensitive substring of the primary name or any alternate name
//! - potency: case-insensitive exact match ("2C" does not match "12C")
//! - an empty query, or the potency sentinel [`ANY_POTENCY`], matches everything

mod interpret;
mod suggest;

pub use interpret::*;
pub use suggest::*;

use crate::models::Medicine;

/// Potency value meaning "do not filter on potency".
pub const ANY_POTENCY: &str = "Any";

/// A structured search over the store.
///
/// Only built through [`SearchFilter::new`], which normalizes the queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Lowercased name query; `None` matches every name
    name: Option<String>,
    /// Lowercased potency query; `None` matches every potency
    potency: Option<String>,
}

impl SearchFilter {
    /// Build a filter, dropping empty queries and the "Any" potency.
    pub fn new(name_query: Option<&str>, potency_query: Option<&str>) -> Self {
        let name = name_query
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let potency = potency_query
            .filter(|q| !q.is_empty() && *q != ANY_POTENCY)
            .map(str::to_lowercase);
        Self { name, potency }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn potency(&self) -> Option<&str> {
        self.potency.as_deref()
    }

    pub fn is_unfiltered(&self) -> bool {
        self.name.is_none() && self.potency.is_none()
    }

    pub fn matches(&self, medicine: &Medicine) -> bool {
        self.matches_name(medicine) && self.matches_potency(medicine)
    }

    fn matches_name(&self, medicine: &Medicine) -> bool {
        let Some(query) = &self.name else {
            return true;
        };
        medicine.name.to_lowercase().contains(query.as_str())
            || medicine
                .alternate_names
                .iter()
                .any(|alt| alt.to_lowercase().contains(query.as_str()))
    }

    fn matches_potency(&self, medicine: &Medicine) -> bool {
        match &self.potency {
            Some(query) => medicine.potency.to_lowercase() == *query,
            None => true,
        }
    }
}
