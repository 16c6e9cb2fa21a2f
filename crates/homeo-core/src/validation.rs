//! Form validation.
//!
//! Turns the flat string map submitted by a form into a [`MedicineInput`], or
//! collects every field problem into [`FieldErrors`]. Validation never stops
//! at the first failure so the form can show all problems at once.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MedicineInput, Preparation};

/// Raw form submission: field name → text.
pub type FormData = HashMap<String, String>;

/// Form field names.
pub mod fields {
    pub const NAME: &str = "name";
    pub const POTENCY: &str = "potency";
    pub const PREPARATION: &str = "preparation";
    pub const BATCH_NUMBER: &str = "batchNumber";
    pub const EXPIRATION_DATE: &str = "expirationDate";
    pub const LOCATION: &str = "location";
    pub const QUANTITY: &str = "quantity";
    pub const SUPPLIER: &str = "supplier";
    pub const ALTERNATE_NAMES: &str = "alternateNames";
    /// Operational failures after validation succeeded.
    pub const SERVER: &str = "server";
}

/// Minimum length of a medicine name, in characters.
pub const MIN_NAME_LEN: usize = 2;

/// A single rule violation on one field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Invalid preparation type. Expected one of: {expected}")]
    InvalidEnum { expected: String },

    #[error("Date must be in YYYY-MM-DD format")]
    BadDateFormat,

    #[error("Quantity must be a whole number")]
    NotAnInteger,

    #[error("Quantity cannot be negative")]
    Negative,

    #[error("Quantity is too large")]
    TooLarge,
}

/// Per-field error messages, in a stable field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding a single operational message under the `server` key.
    pub fn server(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push_message(fields::SERVER, message);
        errors
    }

    pub fn push(&mut self, field: &str, error: FieldError) {
        self.push_message(field, error.to_string());
    }

    pub fn push_message(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages for one field; empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Validate a form submission.
///
/// Missing keys are treated as empty text.
pub fn validate_form(form: &FormData) -> Result<MedicineInput, FieldErrors> {
    let text = |key: &str| form.get(key).map(String::as_str).unwrap_or("");
    let mut errors = FieldErrors::new();

    let name = text(fields::NAME);
    if name.chars().count() < MIN_NAME_LEN {
        errors.push(
            fields::NAME,
            FieldError::TooShort {
                field: "Name",
                min: MIN_NAME_LEN,
            },
        );
    }

    let potency = text(fields::POTENCY);
    if potency.is_empty() {
        errors.push(fields::POTENCY, FieldError::Required { field: "Potency" });
    }

    let preparation = match text(fields::PREPARATION).parse::<Preparation>() {
        Ok(prep) => Some(prep),
        Err(_) => {
            errors.push(
                fields::PREPARATION,
                FieldError::InvalidEnum {
                    expected: Preparation::ALL
                        .iter()
                        .map(Preparation::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                },
            );
            None
        }
    };

    let batch_number = text(fields::BATCH_NUMBER);
    if batch_number.is_empty() {
        errors.push(
            fields::BATCH_NUMBER,
            FieldError::Required {
                field: "Batch number",
            },
        );
    }

    let expiration_date = text(fields::EXPIRATION_DATE);
    if !is_iso_date_format(expiration_date) {
        errors.push(fields::EXPIRATION_DATE, FieldError::BadDateFormat);
    }

    let location = text(fields::LOCATION);
    if location.is_empty() {
        errors.push(fields::LOCATION, FieldError::Required { field: "Location" });
    }

    let quantity = match parse_quantity(text(fields::QUANTITY)) {
        Ok(q) => Some(q),
        Err(e) => {
            errors.push(fields::QUANTITY, e);
            None
        }
    };

    let supplier = Some(text(fields::SUPPLIER))
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let alternate_names = split_alternate_names(text(fields::ALTERNATE_NAMES));

    match (preparation, quantity) {
        (Some(preparation), Some(quantity)) if errors.is_empty() => Ok(MedicineInput {
            name: name.to_string(),
            potency: potency.to_string(),
            preparation,
            batch_number: batch_number.to_string(),
            expiration_date: expiration_date.to_string(),
            location: location.to_string(),
            quantity,
            supplier,
            alternate_names,
        }),
        _ => Err(errors),
    }
}

/// Render a payload back into form fields, e.g. to prefill an edit form.
///
/// Validating the result yields `input` again, as long as no alternate name
/// contains a comma.
pub fn to_form_data(input: &MedicineInput) -> FormData {
    [
        (fields::NAME, input.name.clone()),
        (fields::POTENCY, input.potency.clone()),
        (fields::PREPARATION, input.preparation.to_string()),
        (fields::BATCH_NUMBER, input.batch_number.clone()),
        (fields::EXPIRATION_DATE, input.expiration_date.clone()),
        (fields::LOCATION, input.location.clone()),
        (fields::QUANTITY, input.quantity.to_string()),
        (fields::SUPPLIER, input.supplier.clone().unwrap_or_default()),
        (fields::ALTERNATE_NAMES, input.alternate_names.join(", ")),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Split comma-separated names, trimming each and dropping empty pieces.
pub fn split_alternate_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check the `YYYY-MM-DD` shape. Calendar validity is not checked.
pub fn is_iso_date_format(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Coerce quantity text to a non-negative integer.
fn parse_quantity(raw: &str) -> Result<u32, FieldError> {
    let value: i64 = raw.trim().parse().map_err(|_| FieldError::NotAnInteger)?;
    if value < 0 {
        return Err(FieldError::Negative);
    }
    u32::try_from(value).map_err(|_| FieldError::TooLarge)
}
