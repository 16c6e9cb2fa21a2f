//! Homeo Core Library
//!
//! In-memory inventory and search for homeopathic medicines.
//!
//! # Architecture
//!
//! ```text
//!   Form submission (field → text)          Free-text query
//!               │                                 │
//!               ▼                                 ▼
//!          validate_form                 QueryInterpreter (optional)
//!               │                                 │ hint or failure
//!      ┌────────┴────────┐                        ▼
//!      │ FieldErrors     │ MedicineInput     resolve_search
//!      ▼                 ▼                        │
//!  ActionState     MedicineStore ◄──── SearchFilter
//!                        │
//!                        ▼
//!              ViewInvalidator (/medicines, /search)
//! ```
//!
//! # Core Principle
//!
//! **Bad input never reaches the store.** Validation collects every field
//! error; only a fully valid payload is stored. Operational failures are
//! reported under a separate `server` key.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Medicine, Preparation, patches)
//! - [`validation`]: Form validation into typed payloads
//! - [`store`]: Lock-guarded in-memory collection
//! - [`search`]: Name/potency filtering, query hints, suggestions
//! - [`actions`]: Validate → store → refresh orchestration
//! - [`config`]: TOML configuration with environment overrides
//! - [`telemetry`]: `tracing` subscriber setup

pub mod actions;
pub mod config;
pub mod models;
pub mod search;
pub mod store;
pub mod telemetry;
pub mod validation;

// Re-export commonly used types
pub use actions::{ActionState, InventoryActions, RevisionInvalidator, ViewInvalidator};
pub use config::{Config, ConfigError};
pub use models::{Medicine, MedicineInput, MedicinePatch, Preparation};
pub use search::{QueryHint, QueryInterpreter, SearchFilter};
pub use store::{MedicineStore, StoreError};
pub use validation::{validate_form, FieldErrors, FormData};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use search::{InterpretError, InterpretResult};
use tracing::info;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HomeoError {
    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Interpreter error: {0}")]
    InterpreterError(String),
}

impl From<StoreError> for HomeoError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => HomeoError::NotFound(id),
            other => HomeoError::StoreError(other.to_string()),
        }
    }
}

impl From<ConfigError> for HomeoError {
    fn from(e: ConfigError) -> Self {
        HomeoError::ConfigError(e.to_string())
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for HomeoError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        HomeoError::InterpreterError(e.reason)
    }
}

// =========================================================================
// Query Interpreter Callback
// =========================================================================

/// Query parser implemented by the host application (e.g. an LLM client).
#[uniffi::export(callback_interface)]
pub trait FfiQueryInterpreter: Send + Sync {
    fn interpret(&self, text: String) -> Result<FfiQueryHint, HomeoError>;
}

struct ForeignInterpreter(Box<dyn FfiQueryInterpreter>);

impl QueryInterpreter for ForeignInterpreter {
    fn interpret(&self, text: &str) -> InterpretResult<QueryHint> {
        self.0
            .interpret(text.to_string())
            .map(Into::into)
            .map_err(|e| InterpretError::Unavailable(e.to_string()))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open an inventory configured from `config_path` (or `homeo.toml`).
#[uniffi::export]
pub fn open_inventory(config_path: Option<String>) -> Result<Arc<HomeoInventory>, HomeoError> {
    let config = Config::load(config_path.map(PathBuf::from).as_deref())?;
    HomeoInventory::from_config(&config, None).map(Arc::new)
}

/// Open an inventory whose searches are pre-processed by `interpreter`.
#[uniffi::export]
pub fn open_inventory_with_interpreter(
    config_path: Option<String>,
    interpreter: Box<dyn FfiQueryInterpreter>,
) -> Result<Arc<HomeoInventory>, HomeoError> {
    let config = Config::load(config_path.map(PathBuf::from).as_deref())?;
    let interpreter: Arc<dyn QueryInterpreter> = Arc::new(ForeignInterpreter(interpreter));
    HomeoInventory::from_config(&config, Some(interpreter)).map(Arc::new)
}

/// Create an empty inventory with default settings (for testing).
#[uniffi::export]
pub fn open_inventory_in_memory() -> Arc<HomeoInventory> {
    Arc::new(HomeoInventory::with_actions(|views| {
        InventoryActions::new(Arc::new(MedicineStore::new()), views)
    }))
}

/// Preparation labels accepted by the form.
#[uniffi::export]
pub fn preparation_labels() -> Vec<String> {
    Preparation::ALL.iter().map(|p| p.to_string()).collect()
}

/// Potency labels offered by the search form, after the "Any" option.
#[uniffi::export]
pub fn potency_options() -> Vec<String> {
    std::iter::once(search::ANY_POTENCY)
        .chain(models::RECOGNIZED_POTENCIES.iter().copied())
        .map(String::from)
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe inventory handle for FFI.
#[derive(uniffi::Object)]
pub struct HomeoInventory {
    actions: InventoryActions,
    views: Arc<RevisionInvalidator>,
}

impl HomeoInventory {
    fn with_actions(build: impl FnOnce(Arc<dyn ViewInvalidator>) -> InventoryActions) -> Self {
        let views = Arc::new(RevisionInvalidator::new());
        let invalidator: Arc<dyn ViewInvalidator> = views.clone();
        let actions = build(invalidator);
        Self { actions, views }
    }

    /// Build an inventory from configuration: logging, seed data and search settings.
    pub fn from_config(
        config: &Config,
        interpreter: Option<Arc<dyn QueryInterpreter>>,
    ) -> Result<Self, HomeoError> {
        telemetry::init_tracing(&config.logging.filter);

        let store = Arc::new(MedicineStore::new());
        let seeded = store.seed(config.store.load_seed()?)?;
        info!(count = seeded.len(), "inventory opened");

        Ok(Self::with_actions(|views| {
            let actions = InventoryActions::new(store, views)
                .with_suggestion_limit(config.search.suggestion_limit);
            match interpreter {
                Some(interpreter) if config.search.use_interpreter => {
                    actions.with_interpreter(interpreter)
                }
                _ => actions,
            }
        }))
    }

    pub fn actions(&self) -> &InventoryActions {
        &self.actions
    }
}

#[uniffi::export]
impl HomeoInventory {
    // =========================================================================
    // Record Operations
    // =========================================================================

    /// List every medicine in insertion order.
    pub fn list_medicines(&self) -> Result<Vec<FfiMedicine>, HomeoError> {
        let medicines = self.actions.store().list()?;
        Ok(medicines.into_iter().map(Into::into).collect())
    }

    /// Get a medicine by id.
    pub fn get_medicine(&self, id: String) -> Result<Option<FfiMedicine>, HomeoError> {
        let medicine = self.actions.store().get_by_id(&id)?;
        Ok(medicine.map(Into::into))
    }

    /// Validate a submitted form and add the medicine.
    pub fn add_medicine(&self, form: HashMap<String, String>) -> FfiActionState {
        self.actions.add_medicine(&form).into()
    }

    /// Validate a submitted form and update medicine `id`.
    pub fn update_medicine(&self, id: String, form: HashMap<String, String>) -> FfiActionState {
        self.actions.update_medicine(&id, &form).into()
    }

    pub fn delete_medicine(&self, id: String) -> FfiActionState {
        self.actions.delete_medicine(&id).into()
    }

    // =========================================================================
    // Search Operations
    // =========================================================================

    /// Search by free text and optional potency ("Any" disables the potency filter).
    pub fn search_medicines(
        &self,
        query: String,
        potency: Option<String>,
    ) -> Result<Vec<FfiMedicine>, HomeoError> {
        let medicines = self.actions.search_medicines(&query, potency.as_deref())?;
        Ok(medicines.into_iter().map(Into::into).collect())
    }

    /// Distinct medicine names.
    pub fn medicine_names(&self) -> Result<Vec<String>, HomeoError> {
        Ok(self.actions.medicine_names()?)
    }

    /// Autocomplete suggestions for partial input.
    pub fn suggest_names(&self, input: String) -> Result<Vec<String>, HomeoError> {
        Ok(self.actions.suggest(&input)?)
    }

    // =========================================================================
    // View Refresh
    // =========================================================================

    /// Revision counter for a view path; changes whenever the view is stale.
    pub fn view_revision(&self, view: String) -> u64 {
        self.views.revision(&view)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe medicine.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMedicine {
    pub id: String,
    pub name: String,
    pub potency: String,
    pub preparation: String,
    pub batch_number: String,
    pub expiration_date: String,
    pub location: String,
    pub quantity: u32,
    pub supplier: Option<String>,
    pub alternate_names: Vec<String>,
}

impl From<Medicine> for FfiMedicine {
    fn from(medicine: Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name,
            potency: medicine.potency,
            preparation: medicine.preparation.to_string(),
            batch_number: medicine.batch_number,
            expiration_date: medicine.expiration_date,
            location: medicine.location,
            quantity: medicine.quantity,
            supplier: medicine.supplier,
            alternate_names: medicine.alternate_names,
        }
    }
}

/// FFI-safe action result. `errors` is empty on success.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiActionState {
    pub message: String,
    pub success: bool,
    pub errors: HashMap<String, Vec<String>>,
}

impl From<ActionState> for FfiActionState {
    fn from(state: ActionState) -> Self {
        Self {
            message: state.message,
            success: state.success,
            errors: state
                .errors
                .map(|e| e.into_map().into_iter().collect())
                .unwrap_or_default(),
        }
    }
}

/// FFI-safe query hint.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct FfiQueryHint {
    pub medicine_name: Option<String>,
    pub potency: Option<String>,
    pub intent: Option<String>,
}

impl From<FfiQueryHint> for QueryHint {
    fn from(hint: FfiQueryHint) -> Self {
        QueryHint {
            medicine_name: hint.medicine_name,
            potency: hint.potency,
            intent: hint.intent,
        }
    }
}
