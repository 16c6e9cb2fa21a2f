//! Inventory actions exposed to the presentation layer.
//!
//! Each action is one unit of work: validate, mutate the store, tell dependent
//! views to refresh, and report an [`ActionState`]. Nothing is mutated when
//! validation fails, and views are only invalidated after a successful
//! mutation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Medicine, MedicinePatch};
use crate::search::{resolve_search, suggest_names, QueryInterpreter};
use crate::store::{MedicineStore, StoreError, StoreResult};
use crate::validation::{validate_form, FieldErrors, FormData};

/// View listing every medicine.
pub const MEDICINES_VIEW: &str = "/medicines";
/// View showing search results and autocomplete names.
pub const SEARCH_VIEW: &str = "/search";

/// Outcome of an action, shaped for rendering next to a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    pub message: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ActionState {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
            errors: None,
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self {
            message: "Validation failed. Please check the form.".into(),
            success: false,
            errors: Some(errors),
        }
    }

    /// An operational failure, reported under the `server` key.
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            errors: Some(FieldErrors::server(message.clone())),
            message,
            success: false,
        }
    }
}

/// Tells cached views that their data changed.
pub trait ViewInvalidator: Send + Sync {
    fn invalidate(&self, view: &str);
}

/// Invalidator that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

impl ViewInvalidator for NoopInvalidator {
    fn invalidate(&self, _view: &str) {}
}

/// Counts invalidations per view so a UI can poll for changes.
#[derive(Debug, Default)]
pub struct RevisionInvalidator {
    revisions: Mutex<HashMap<String, u64>>,
}

impl RevisionInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current revision of a view; 0 until it is first invalidated.
    pub fn revision(&self, view: &str) -> u64 {
        self.revisions
            .lock()
            .map(|r| r.get(view).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl ViewInvalidator for RevisionInvalidator {
    fn invalidate(&self, view: &str) {
        if let Ok(mut revisions) = self.revisions.lock() {
            *revisions.entry(view.to_string()).or_insert(0) += 1;
        }
    }
}

/// Orchestrates validation, storage and view invalidation.
pub struct InventoryActions {
    store: Arc<MedicineStore>,
    invalidator: Arc<dyn ViewInvalidator>,
    interpreter: Option<Arc<dyn QueryInterpreter>>,
    suggestion_limit: usize,
}

impl InventoryActions {
    /// Default number of autocomplete suggestions.
    pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

    pub fn new(store: Arc<MedicineStore>, invalidator: Arc<dyn ViewInvalidator>) -> Self {
        Self {
            store,
            invalidator,
            interpreter: None,
            suggestion_limit: Self::DEFAULT_SUGGESTION_LIMIT,
        }
    }

    /// Use `interpreter` to pre-process free-text searches.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: Arc<dyn QueryInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    #[must_use]
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    pub fn store(&self) -> &MedicineStore {
        &self.store
    }

    fn refresh_views(&self) {
        self.invalidator.invalidate(MEDICINES_VIEW);
        self.invalidator.invalidate(SEARCH_VIEW);
    }

    /// Validate a form and add the medicine it describes.
    pub fn add_medicine(&self, form: &FormData) -> ActionState {
        let input = match validate_form(form) {
            Ok(input) => input,
            Err(errors) => return ActionState::invalid(errors),
        };

        match self.store.create(input) {
            Ok(medicine) => {
                info!(id = %medicine.id, name = %medicine.name, "medicine added");
                self.refresh_views();
                ActionState::ok(format!("Added {} {}", medicine.name, medicine.potency))
            }
            Err(e) => {
                warn!(error = %e, "add medicine failed");
                ActionState::failed(format!("Failed to add medicine: {e}"))
            }
        }
    }

    /// Validate a form and replace the fields of medicine `id`.
    pub fn update_medicine(&self, id: &str, form: &FormData) -> ActionState {
        let input = match validate_form(form) {
            Ok(input) => input,
            Err(errors) => return ActionState::invalid(errors),
        };

        match self.store.update(id, MedicinePatch::from(input)) {
            Ok(medicine) => {
                info!(id, "medicine updated");
                self.refresh_views();
                ActionState::ok(format!("Updated {} {}", medicine.name, medicine.potency))
            }
            Err(StoreError::NotFound(_)) => {
                warn!(id, "update of unknown medicine");
                ActionState::failed("Medicine not found")
            }
            Err(e) => {
                warn!(error = %e, id, "update medicine failed");
                ActionState::failed(format!("Failed to update medicine: {e}"))
            }
        }
    }

    pub fn delete_medicine(&self, id: &str) -> ActionState {
        match self.store.delete(id) {
            Ok(true) => {
                info!(id, "medicine deleted");
                self.refresh_views();
                ActionState::ok("Medicine deleted")
            }
            Ok(false) => ActionState::failed("Medicine not found"),
            Err(e) => {
                warn!(error = %e, id, "delete medicine failed");
                ActionState::failed(format!("Failed to delete medicine: {e}"))
            }
        }
    }

    /// Search with free text and an optional potency.
    ///
    /// The configured interpreter, if any, may refine the text into a name and
    /// potency; its failures never fail the search. When the refined filter
    /// finds nothing, the raw text is searched instead.
    pub fn search_medicines(&self, text: &str, potency: Option<&str>) -> StoreResult<Vec<Medicine>> {
        let filter = resolve_search(text, potency, self.interpreter.as_deref());
        let results = self.store.search_with(&filter)?;
        if !results.is_empty() || self.interpreter.is_none() {
            return Ok(results);
        }

        let raw = resolve_search(text, potency, None);
        if raw == filter {
            return Ok(results);
        }
        debug!(query = text, "interpreted search found nothing, retrying raw text");
        self.store.search_with(&raw)
    }

    /// Distinct medicine names for autocomplete.
    pub fn medicine_names(&self) -> StoreResult<Vec<String>> {
        self.store.list_unique_names()
    }

    /// Names ranked against partial input.
    pub fn suggest(&self, input: &str) -> StoreResult<Vec<String>> {
        let names = self.store.list_unique_names()?;
        Ok(suggest_names(&names, input, self.suggestion_limit))
    }
}
