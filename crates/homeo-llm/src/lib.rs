//! Search query interpretation for the homeopathic inventory.
//!
//! This crate turns free-text searches into structured
//! [`QueryHint`](homeo_core::search::QueryHint)s, either by prompting a
//! language model through [`CompletionInterpreter`] or with the rule-based
//! [`HeuristicInterpreter`].

pub mod prompts;
pub mod extraction;

pub use extraction::*;
pub use prompts::*;
