//! Free-text query interpretation.
//!
//! A [`QueryInterpreter`] turns text such as "arnica thirty c for bruising"
//! into a [`QueryHint`]. Interpretation is best-effort: when it fails the
//! search runs on the raw text instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{SearchFilter, ANY_POTENCY};

/// Interpretation errors.
#[derive(Error, Debug)]
pub enum InterpretError {
    #[error("Interpreter unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid interpreter output: {0}")]
    InvalidOutput(String),
}

pub type InterpretResult<T> = Result<T, InterpretError>;

/// Structured guess extracted from a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryHint {
    #[serde(default)]
    pub medicine_name: Option<String>,
    #[serde(default)]
    pub potency: Option<String>,
    /// What the user seems to want (e.g., "find", "check stock")
    #[serde(default)]
    pub intent: Option<String>,
}

/// Query-parsing collaborator.
pub trait QueryInterpreter: Send + Sync {
    fn interpret(&self, text: &str) -> InterpretResult<QueryHint>;
}

impl<F> QueryInterpreter for F
where
    F: Fn(&str) -> InterpretResult<QueryHint> + Send + Sync,
{
    fn interpret(&self, text: &str) -> InterpretResult<QueryHint> {
        self(text)
    }
}

/// Work out the effective search filter for a free-text query.
///
/// The hinted name replaces the raw text when present. An explicit potency
/// (anything other than empty or "Any") wins over the hinted one. Interpreter
/// failures are logged and the raw text is used unchanged.
pub fn resolve_search(
    text: &str,
    potency: Option<&str>,
    interpreter: Option<&dyn QueryInterpreter>,
) -> SearchFilter {
    let text = text.trim();
    let explicit_potency = potency.filter(|p| !p.is_empty() && *p != ANY_POTENCY);

    let hint = match interpreter {
        Some(interpreter) if !text.is_empty() => match interpreter.interpret(text) {
            Ok(hint) => {
                debug!(?hint, "query interpreted");
                Some(hint)
            }
            Err(e) => {
                warn!(error = %e, query = text, "query interpretation failed, using raw text");
                None
            }
        },
        _ => None,
    };

    let Some(hint) = hint else {
        return SearchFilter::new(Some(text), explicit_potency);
    };

    let name = hint
        .medicine_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(text);
    let potency = explicit_potency.or(hint.potency.as_deref().map(str::trim));
    SearchFilter::new(Some(name), potency)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hinting(name: Option<&'static str>, potency: Option<&'static str>) -> impl QueryInterpreter {
        move |_: &str| -> InterpretResult<QueryHint> {
            Ok(QueryHint {
                medicine_name: name.map(String::from),
                potency: potency.map(String::from),
                intent: Some("find".into()),
            })
        }
    }

    fn failing(_: &str) -> InterpretResult<QueryHint> {
        Err(InterpretError::Unavailable("connection refused".into()))
    }

    #[test]
    fn test_without_interpreter_uses_raw_text() {
        let filter = resolve_search("  Arnica ", Some("30C"), None);
        assert_eq!(filter, SearchFilter::new(Some("arnica"), Some("30C")));
    }

    #[test]
    fn test_hint_replaces_text() {
        let interpreter = hinting(Some("Arnica Montana"), Some("200C"));
        let filter = resolve_search("arnica two hundred c", None, Some(&interpreter));
        assert_eq!(filter.name(), Some("arnica montana"));
        assert_eq!(filter.potency(), Some("200c"));
    }

    #[test]
    fn test_explicit_potency_wins() {
        let interpreter = hinting(Some("Arnica"), Some("200C"));
        let filter = resolve_search("arnica 200c", Some("30C"), Some(&interpreter));
        assert_eq!(filter.potency(), Some("30c"));

        let filter = resolve_search("arnica 200c", Some("Any"), Some(&interpreter));
        assert_eq!(filter.potency(), Some("200c"));
    }

    #[test]
    fn test_empty_hint_name_falls_back_to_text() {
        let interpreter = hinting(Some("  "), None);
        let filter = resolve_search("sulphur", None, Some(&interpreter));
        assert_eq!(filter.name(), Some("sulphur"));
        assert_eq!(filter.potency(), None);
    }

    #[test]
    fn test_failure_degrades_to_raw_text() {
        let filter = resolve_search("Belladonna", Some("Any"), Some(&failing));
        assert_eq!(filter, SearchFilter::new(Some("belladonna"), None));
    }

    #[test]
    fn test_empty_text_skips_interpreter() {
        let called = std::sync::atomic::AtomicBool::new(false);
        let interpreter = |_: &str| -> InterpretResult<QueryHint> {
            called.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(QueryHint::default())
        };
        let filter = resolve_search("", Some("6C"), Some(&interpreter));
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(filter.potency(), Some("6c"));
    }

    #[test]
    fn test_hint_deserializes_camel_case() {
        let hint: QueryHint =
            serde_json::from_str(r#"{"medicineName":"Arnica","potency":"30C"}"#).unwrap();
        assert_eq!(hint.medicine_name.as_deref(), Some("Arnica"));
        assert_eq!(hint.intent, None);
    }
}
