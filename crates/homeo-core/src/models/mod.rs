//! Domain models for the homeopathic inventory.

mod medicine;

pub use medicine::*;
