//! Query hint extraction from model output and from plain text.

use homeo_core::models::is_recognized_potency;
use homeo_core::search::{InterpretError, InterpretResult, QueryHint, QueryInterpreter};
use thiserror::Error;
use tracing::debug;

use crate::prompts::{build_full_prompt, JSON_GRAMMAR};

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Completion error: {0}")]
    Completion(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

impl From<ExtractionError> for InterpretError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::Completion(msg) => InterpretError::Unavailable(msg),
            other => InterpretError::InvalidOutput(other.to_string()),
        }
    }
}

/// Parse model output into a [`QueryHint`].
///
/// Text around the JSON object is ignored. Blank fields become `None` and
/// potencies are canonicalized ("30c" → "30C").
pub fn parse_hint_output(output: &str) -> ExtractionResult<QueryHint> {
    // Try to find JSON in the response (in case the model adds extra text)
    let json_start = output.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = output.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace before opening brace".into(),
        ));
    }

    let hint: QueryHint = serde_json::from_str(&output[json_start..=json_end])?;
    let blank_to_none = |s: Option<String>| {
        s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };

    let potency = blank_to_none(hint.potency);
    Ok(QueryHint {
        medicine_name: blank_to_none(hint.medicine_name),
        potency: potency.map(|p| canonical_potency(&p).unwrap_or(p)),
        intent: blank_to_none(hint.intent),
    })
}

/// Interpreter backed by any text completion function, e.g. a local model.
///
/// The function receives the prompt and, unless disabled, [`JSON_GRAMMAR`] to
/// constrain sampling.
pub struct CompletionInterpreter<F> {
    complete: F,
    include_examples: bool,
    grammar: Option<&'static str>,
}

impl<F> CompletionInterpreter<F>
where
    F: Fn(&str, Option<&str>) -> Result<String, String> + Send + Sync,
{
    pub fn new(complete: F) -> Self {
        Self {
            complete,
            include_examples: true,
            grammar: Some(JSON_GRAMMAR),
        }
    }

    /// Send no grammar (for backends without constrained sampling).
    pub fn without_grammar(mut self) -> Self {
        self.grammar = None;
        self
    }

    /// Leave few-shot examples out of the prompt (shorter, less accurate).
    pub fn without_examples(mut self) -> Self {
        self.include_examples = false;
        self
    }

    pub fn extract(&self, query: &str) -> ExtractionResult<QueryHint> {
        let prompt = build_full_prompt(query, self.include_examples);
        let output = (self.complete)(&prompt, self.grammar).map_err(ExtractionError::Completion)?;
        debug!(output = %output, "completion received");
        parse_hint_output(&output)
    }
}

impl<F> QueryInterpreter for CompletionInterpreter<F>
where
    F: Fn(&str, Option<&str>) -> Result<String, String> + Send + Sync,
{
    fn interpret(&self, text: &str) -> InterpretResult<QueryHint> {
        Ok(self.extract(text)?)
    }
}

/// Words that carry no remedy name.
const FILLER_WORDS: &[&str] = &[
    "a", "an", "any", "are", "do", "does", "find", "for", "have", "in", "is", "left", "me",
    "of", "potency", "search", "show", "some", "still", "stock", "the", "there", "we",
    "what", "when", "which", "expire", "expires", "expiring", "expiry", "soon", "how", "much",
    "many", "got",
];

/// Rule-based interpreter for use without a model.
///
/// Pulls potency tokens out of the text ("30c", "200 C", "1M", "Q"), keeping a
/// recognized label over an unusual one, and uses what remains as the name
/// with filler words trimmed from both ends. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicInterpreter;

impl HeuristicInterpreter {
    pub fn extract(text: &str) -> QueryHint {
        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_string()
            })
            .filter(|t| !t.is_empty())
            .collect();

        let mut potencies = Vec::new();
        let mut words = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if let Some(p) = canonical_potency(token) {
                potencies.push(p);
                i += 1;
                continue;
            }
            // "200 c", "6 x"
            if let Some(next) = tokens.get(i + 1) {
                if token.chars().all(|c| c.is_ascii_digit()) {
                    if let Some(p) = canonical_potency(&format!("{token}{next}")) {
                        potencies.push(p);
                        i += 2;
                        continue;
                    }
                }
            }
            words.push(token.as_str());
            i += 1;
        }

        // Filler inside the name stays: "Oil of Wintergreen".
        let start = words
            .iter()
            .position(|w| !is_filler(w))
            .unwrap_or(words.len());
        let end = words
            .iter()
            .rposition(|w| !is_filler(w))
            .map_or(start, |last| last + 1);
        let name = words[start..end].join(" ");

        let potency = potencies
            .iter()
            .find(|p| is_recognized_potency(p))
            .or_else(|| potencies.first())
            .cloned();

        let lower = text.to_lowercase();
        let intent = if lower.contains("expir") {
            "check_expiry"
        } else if lower.contains("stock") || lower.contains("have") || lower.contains("left") {
            "check_stock"
        } else {
            "find"
        };

        QueryHint {
            medicine_name: Some(name).filter(|n| !n.is_empty()),
            potency,
            intent: Some(intent.to_string()),
        }
    }
}

impl QueryInterpreter for HeuristicInterpreter {
    fn interpret(&self, text: &str) -> InterpretResult<QueryHint> {
        Ok(Self::extract(text))
    }
}

/// Canonical form of a potency token, or `None` if it is not one.
///
/// Accepts decimal/centesimal/millesimal scales ("6x", "30c", "200ch", "1m"),
/// LM potencies ("lm1"), "CM", and mother tincture ("q", "mt").
pub fn canonical_potency(token: &str) -> Option<String> {
    let lower = token.trim().to_lowercase();
    match lower.as_str() {
        "q" | "mt" => return Some("Q".into()),
        "cm" => return Some("CM".into()),
        _ => {}
    }

    if let Some(digits) = lower.strip_prefix("lm") {
        return is_count(digits).then(|| format!("LM{digits}"));
    }

    let (digits, scale) = if let Some(d) = lower.strip_suffix("ch") {
        (d, 'C')
    } else {
        let scale = lower.chars().last()?;
        let d = &lower[..lower.len() - scale.len_utf8()];
        match scale {
            'c' => (d, 'C'),
            'x' | 'd' => (d, 'X'),
            'm' => (d, 'M'),
            _ => return None,
        }
    };
    is_count(digits).then(|| format!("{digits}{scale}"))
}

fn is_filler(word: &str) -> bool {
    FILLER_WORDS.contains(&word.to_lowercase().as_str())
}

fn is_count(digits: &str) -> bool {
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) && !digits.starts_with('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hint_output() {
        let json = r#"{"medicineName":"Arnica Montana","potency":"30c","intent":"find"}"#;
        let hint = parse_hint_output(json).unwrap();
        assert_eq!(hint.medicine_name.as_deref(), Some("Arnica Montana"));
        assert_eq!(hint.potency.as_deref(), Some("30C"));
        assert_eq!(hint.intent.as_deref(), Some("find"));
    }

    #[test]
    fn test_parse_hint_output_with_prefix() {
        let output = "Sure! Here is the result:\n{\"medicineName\":\"Sulphur\",\"potency\":null,\"intent\":null}\nThanks";
        let hint = parse_hint_output(output).unwrap();
        assert_eq!(hint.medicine_name.as_deref(), Some("Sulphur"));
        assert_eq!(hint.potency, None);
    }

    #[test]
    fn test_parse_hint_blank_fields() {
        let hint = parse_hint_output(r#"{"medicineName":"  ","potency":""}"#).unwrap();
        assert_eq!(hint, QueryHint::default());
    }

    #[test]
    fn test_parse_hint_keeps_unknown_potency_text() {
        let hint = parse_hint_output(r#"{"potency":"high"}"#).unwrap();
        assert_eq!(hint.potency.as_deref(), Some("high"));
    }

    #[test]
    fn test_parse_hint_invalid() {
        assert!(matches!(
            parse_hint_output("no json here"),
            Err(ExtractionError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_hint_output("} oops {"),
            Err(ExtractionError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_hint_output("{not json}"),
            Err(ExtractionError::JsonParse(_))
        ));
    }

    #[test]
    fn test_canonical_potency() {
        assert_eq!(canonical_potency("30c").as_deref(), Some("30C"));
        assert_eq!(canonical_potency("200CH").as_deref(), Some("200C"));
        assert_eq!(canonical_potency("6x").as_deref(), Some("6X"));
        assert_eq!(canonical_potency("6D").as_deref(), Some("6X"));
        assert_eq!(canonical_potency("1M").as_deref(), Some("1M"));
        assert_eq!(canonical_potency("lm3").as_deref(), Some("LM3"));
        assert_eq!(canonical_potency("Q").as_deref(), Some("Q"));
        assert_eq!(canonical_potency("cm").as_deref(), Some("CM"));
        assert_eq!(canonical_potency("c"), None);
        assert_eq!(canonical_potency("030c"), None);
        assert_eq!(canonical_potency("arnica"), None);
        assert_eq!(canonical_potency("mom"), None);
        assert_eq!(canonical_potency(""), None);
    }

    #[test]
    fn test_heuristic_name_and_potency() {
        let hint = HeuristicInterpreter::extract("Arnica Montana 30c");
        assert_eq!(hint.medicine_name.as_deref(), Some("Arnica Montana"));
        assert_eq!(hint.potency.as_deref(), Some("30C"));
        assert_eq!(hint.intent.as_deref(), Some("find"));
    }

    #[test]
    fn test_heuristic_split_potency_and_fillers() {
        let hint = HeuristicInterpreter::extract("do we have any nux vomica 200 c in stock?");
        assert_eq!(hint.medicine_name.as_deref(), Some("nux vomica"));
        assert_eq!(hint.potency.as_deref(), Some("200C"));
        assert_eq!(hint.intent.as_deref(), Some("check_stock"));
    }

    #[test]
    fn test_heuristic_expiry_intent() {
        let hint = HeuristicInterpreter::extract("which belladonna expires soon");
        assert_eq!(hint.medicine_name.as_deref(), Some("belladonna"));
        assert_eq!(hint.potency, None);
        assert_eq!(hint.intent.as_deref(), Some("check_expiry"));
    }

    #[test]
    fn test_heuristic_keeps_inner_filler_words() {
        let hint = HeuristicInterpreter::extract("do we have oil of wintergreen in stock");
        assert_eq!(hint.medicine_name.as_deref(), Some("oil of wintergreen"));

        let hint = HeuristicInterpreter::extract("the spirit of nitre 6x");
        assert_eq!(hint.medicine_name.as_deref(), Some("spirit of nitre"));
        assert_eq!(hint.potency.as_deref(), Some("6X"));
    }

    #[test]
    fn test_heuristic_prefers_recognized_potency() {
        let hint = HeuristicInterpreter::extract("sulphur 7c 30c");
        assert_eq!(hint.medicine_name.as_deref(), Some("sulphur"));
        assert_eq!(hint.potency.as_deref(), Some("30C"));

        let hint = HeuristicInterpreter::extract("sulphur 7c");
        assert_eq!(hint.potency.as_deref(), Some("7C"));
    }

    #[test]
    fn test_heuristic_keeps_apostrophes() {
        let hint = HeuristicInterpreter::extract("leopard's bane");
        assert_eq!(hint.medicine_name.as_deref(), Some("leopard's bane"));
    }

    #[test]
    fn test_heuristic_potency_only() {
        let hint = HeuristicInterpreter::extract("show me 6x");
        assert_eq!(hint.medicine_name, None);
        assert_eq!(hint.potency.as_deref(), Some("6X"));
    }

    #[test]
    fn test_completion_interpreter() {
        let interpreter = CompletionInterpreter::new(
            |prompt: &str, grammar: Option<&str>| -> Result<String, String> {
                assert!(prompt.contains("arnica thirty"));
                assert_eq!(grammar, Some(JSON_GRAMMAR));
                Ok(r#"{"medicineName":"Arnica Montana","potency":"30C","intent":"find"}"#.to_string())
            },
        );
        let hint = interpreter.interpret("arnica thirty").unwrap();
        assert_eq!(hint.potency.as_deref(), Some("30C"));
    }

    #[test]
    fn test_completion_without_grammar() {
        let interpreter = CompletionInterpreter::new(
            |_: &str, grammar: Option<&str>| -> Result<String, String> {
                assert_eq!(grammar, None);
                Ok(r#"{"medicineName":"Sulphur","potency":null,"intent":null}"#.to_string())
            },
        )
        .without_grammar();
        let hint = interpreter.interpret("sulphur").unwrap();
        assert_eq!(hint.medicine_name.as_deref(), Some("Sulphur"));
    }

    #[test]
    fn test_completion_failure_maps_to_unavailable() {
        let interpreter = CompletionInterpreter::new(|_: &str, _: Option<&str>| -> Result<String, String> {
            Err("model not loaded".to_string())
        })
        .without_examples();
        assert!(matches!(
            interpreter.interpret("arnica"),
            Err(InterpretError::Unavailable(msg)) if msg == "model not loaded"
        ));
    }

    #[test]
    fn test_garbage_completion_maps_to_invalid_output() {
        let interpreter = CompletionInterpreter::new(|_: &str, _: Option<&str>| -> Result<String, String> {
            Ok("I don't know".to_string())
        });
        assert!(matches!(
            interpreter.interpret("arnica"),
            Err(InterpretError::InvalidOutput(_))
        ));
    }
}
