//! Prompts for homeopathic search query interpretation.
//!
//! These prompts ask a small instruction model for a single JSON object.

/// System prompt for query interpretation.
pub const SYSTEM_PROMPT: &str = r#"You are an assistant for a homeopathic pharmacy inventory search.

Read the user's search text and extract:
- medicineName: The remedy name (Latin name, common name, or abbreviation)
- potency: The dilution label, written like 6X, 30C, 200C, 1M, 10M or Q (null if not given)
- intent: What the user wants, one of "find", "check_stock", "check_expiry" (null if unclear)

Potency words may be spelled out: "thirty c" = 30C, "two hundred" = 200C, "one m" = 1M.
Common abbreviations:
- arnica = Arnica Montana
- nux vom = Nux Vomica
- bell = Belladonna
- calc carb = Calcarea Carbonica
- rhus tox = Rhus Toxicodendron

Output one JSON object with the keys "medicineName", "potency" and "intent"."#;

/// User prompt template for query interpretation.
pub fn make_query_prompt(query: &str) -> String {
    format!(
        r#"Interpret this inventory search:

"{}"

Return a JSON object with:
- medicineName: The remedy name (null if none)
- potency: The potency label in canonical form (null if none)
- intent: "find", "check_stock" or "check_expiry" (null if unclear)"#,
        query
    )
}

/// JSON grammar constraint to keep model output parseable.
pub const JSON_GRAMMAR: &str = r#"
root ::= "{" ws
    "\"medicineName\"" ws ":" ws (string | "null") ws "," ws
    "\"potency\"" ws ":" ws (string | "null") ws "," ws
    "\"intent\"" ws ":" ws (string | "null") ws
"}"
string ::= "\"" ([^"\\] | "\\" .)* "\""
ws ::= [ \t\n]*
"#;

/// Few-shot examples for better extraction accuracy.
pub const FEW_SHOT_EXAMPLES: &[(&str, &str)] = &[
    (
        "arnica 30c",
        r#"{"medicineName":"Arnica Montana","potency":"30C","intent":"find"}"#,
    ),
    (
        "do we still have any nux vom two hundred",
        r#"{"medicineName":"Nux Vomica","potency":"200C","intent":"check_stock"}"#,
    ),
    (
        "which belladonna is expiring soon",
        r#"{"medicineName":"Belladonna","potency":null,"intent":"check_expiry"}"#,
    ),
];

/// Build a complete prompt with system context and optional few-shot examples.
pub fn build_full_prompt(query: &str, include_examples: bool) -> String {
    let mut prompt = String::new();

    prompt.push_str("<|system|>\n");
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    if include_examples {
        for (input, output) in FEW_SHOT_EXAMPLES {
            prompt.push_str("<|user|>\n");
            prompt.push_str(&make_query_prompt(input));
            prompt.push_str("\n<|end|>\n");
            prompt.push_str("<|assistant|>\n");
            prompt.push_str(output);
            prompt.push_str("\n<|end|>\n");
        }
    }

    prompt.push_str("<|user|>\n");
    prompt.push_str(&make_query_prompt(query));
    prompt.push_str("\n<|end|>\n");
    prompt.push_str("<|assistant|>\n");

    prompt
}
