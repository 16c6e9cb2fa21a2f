//! Medicine inventory models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Potency labels the inventory recognizes. Potency is still stored as free text.
pub const RECOGNIZED_POTENCIES: &[&str] = &[
    "Q", "1X", "3X", "6X", "12X", "30X", "3C", "6C", "12C", "30C", "200C", "1M", "10M", "50M",
    "CM",
];

/// Check whether a potency label is one of [`RECOGNIZED_POTENCIES`] (case-insensitive).
pub fn is_recognized_potency(potency: &str) -> bool {
    RECOGNIZED_POTENCIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(potency.trim()))
}

/// Physical form of a medicine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Preparation {
    Pellets,
    Globules,
    Liquid,
    Tablet,
    Ointment,
    Other,
}

impl Preparation {
    /// Every preparation, in form display order.
    pub const ALL: [Preparation; 6] = [
        Preparation::Pellets,
        Preparation::Globules,
        Preparation::Liquid,
        Preparation::Tablet,
        Preparation::Ointment,
        Preparation::Other,
    ];

    /// The label used in forms and serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Preparation::Pellets => "Pellets",
            Preparation::Globules => "Globules",
            Preparation::Liquid => "Liquid",
            Preparation::Tablet => "Tablet",
            Preparation::Ointment => "Ointment",
            Preparation::Other => "Other",
        }
    }
}

impl fmt::Display for Preparation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label is not one of the six preparations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preparation: {0}")]
pub struct UnknownPreparation(pub String);

impl FromStr for Preparation {
    type Err = UnknownPreparation;

    /// Labels must match exactly; "pellets" is not a preparation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preparation::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPreparation(s.to_string()))
    }
}

/// A validated medicine payload, everything except the store-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInput {
    pub name: String,
    pub potency: String,
    pub preparation: Preparation,
    pub batch_number: String,
    /// `YYYY-MM-DD`; format-checked only
    pub expiration_date: String,
    pub location: String,
    pub quantity: u32,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub alternate_names: Vec<String>,
}

/// A medicine in the inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    /// Store-assigned identifier, immutable after creation
    pub id: String,
    /// Primary name (e.g., "Arnica Montana")
    pub name: String,
    /// Dilution label (e.g., "30C", "200C")
    pub potency: String,
    pub preparation: Preparation,
    pub batch_number: String,
    pub expiration_date: String,
    /// Shelf or cabinet (e.g., "Shelf A1")
    pub location: String,
    pub quantity: u32,
    pub supplier: Option<String>,
    /// Other names the medicine can be searched under
    pub alternate_names: Vec<String>,
}

impl Medicine {
    /// Build a record from a validated payload and an assigned id.
    pub fn new(id: String, input: MedicineInput) -> Self {
        Self {
            id,
            name: input.name,
            potency: input.potency,
            preparation: input.preparation,
            batch_number: input.batch_number,
            expiration_date: input.expiration_date,
            location: input.location,
            quantity: input.quantity,
            supplier: input.supplier,
            alternate_names: input.alternate_names,
        }
    }

    /// The record without its id.
    pub fn to_input(&self) -> MedicineInput {
        MedicineInput {
            name: self.name.clone(),
            potency: self.potency.clone(),
            preparation: self.preparation,
            batch_number: self.batch_number.clone(),
            expiration_date: self.expiration_date.clone(),
            location: self.location.clone(),
            quantity: self.quantity,
            supplier: self.supplier.clone(),
            alternate_names: self.alternate_names.clone(),
        }
    }

    /// Merge a partial update field by field. The id never changes.
    pub fn apply(&mut self, patch: MedicinePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(potency) = patch.potency {
            self.potency = potency;
        }
        if let Some(preparation) = patch.preparation {
            self.preparation = preparation;
        }
        if let Some(batch_number) = patch.batch_number {
            self.batch_number = batch_number;
        }
        if let Some(expiration_date) = patch.expiration_date {
            self.expiration_date = expiration_date;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(supplier) = patch.supplier {
            self.supplier = supplier;
        }
        if let Some(alternate_names) = patch.alternate_names {
            self.alternate_names = alternate_names;
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Whether the expiration date falls before `today`.
    ///
    /// Dates that are well-formed but not real calendar dates (e.g. "2025-02-30")
    /// cannot be compared and are never reported as expired.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        NaiveDate::parse_from_str(&self.expiration_date, "%Y-%m-%d")
            .map(|date| date < today)
            .unwrap_or(false)
    }
}

/// Partial update: `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicinePatch {
    pub name: Option<String>,
    pub potency: Option<String>,
    pub preparation: Option<Preparation>,
    pub batch_number: Option<String>,
    pub expiration_date: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<u32>,
    /// `Some(None)` clears the supplier
    pub supplier: Option<Option<String>>,
    pub alternate_names: Option<Vec<String>>,
}

impl MedicinePatch {
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }
}

impl From<MedicineInput> for MedicinePatch {
    /// A full payload replaces every field.
    fn from(input: MedicineInput) -> Self {
        Self {
            name: Some(input.name),
            potency: Some(input.potency),
            preparation: Some(input.preparation),
            batch_number: Some(input.batch_number),
            expiration_date: Some(input.expiration_date),
            location: Some(input.location),
            quantity: Some(input.quantity),
            supplier: Some(input.supplier),
            alternate_names: Some(input.alternate_names),
        }
    }
}
