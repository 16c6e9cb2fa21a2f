//! Autocomplete suggestions over medicine names.

use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a fuzzy suggestion.
const MIN_SIMILARITY: f64 = 0.80;

/// Rank `names` against partial input.
///
/// Prefix matches come first, then substring matches, then fuzzy matches by
/// descending similarity. Ties keep the order of `names`. Empty input returns
/// the first `limit` names.
pub fn suggest_names(names: &[String], input: &str, limit: usize) -> Vec<String> {
    let query = input.trim().to_lowercase();
    if query.is_empty() {
        return names.iter().take(limit).cloned().collect();
    }

    let mut ranked: Vec<(u8, f64, &String)> = names
        .iter()
        .filter_map(|name| {
            let lower = name.to_lowercase();
            if lower.starts_with(&query) {
                Some((0, 1.0, name))
            } else if lower.contains(&query) {
                Some((1, 1.0, name))
            } else {
                // compare against the same-length head so short input can match long names
                let head: String = lower.chars().take(query.chars().count()).collect();
                let score = jaro_winkler(&query, &head).max(jaro_winkler(&query, &lower));
                (score >= MIN_SIMILARITY).then_some((2, score, name))
            }
        })
        .collect();

    // stable sort keeps input order within a tier
    ranked.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|(_, _, name)| name.clone())
        .collect()
}
