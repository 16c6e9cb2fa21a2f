//! Golden tests for name/potency search.
//!
//! Each case runs against the same fixed inventory and lists the expected
//! record names in insertion order.

use homeo_core::models::{MedicineInput, Preparation};
use homeo_core::store::MedicineStore;

/// Test case from golden table.
struct GoldenCase {
    id: &'static str,
    name_query: Option<&'static str>,
    potency_query: Option<&'static str>,
    expected: &'static [&'static str],
}

fn medicine(name: &str, potency: &str, alternates: &[&str]) -> MedicineInput {
    MedicineInput {
        name: name.to_string(),
        potency: potency.to_string(),
        preparation: Preparation::Pellets,
        batch_number: format!("{name}-{potency}"),
        expiration_date: "2027-06-30".to_string(),
        location: "Cabinet 1".to_string(),
        quantity: 20,
        supplier: None,
        alternate_names: alternates.iter().map(|s| s.to_string()).collect(),
    }
}

fn inventory() -> MedicineStore {
    let store = MedicineStore::new();
    store
        .seed([
            medicine("Arnica Montana", "30C", &["Leopard's Bane", "Mountain Tobacco"]),
            medicine("Arnica Montana", "200C", &["Leopard's Bane"]),
            medicine("Belladonna", "12C", &["Deadly Nightshade"]),
            medicine("Nux Vomica", "2C", &["Poison Nut"]),
            medicine("Sulphur", "1M", &[]),
            medicine("Calendula Officinalis", "Q", &["Marigold"]),
        ])
        .unwrap();
    store
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "no-filters",
            name_query: None,
            potency_query: None,
            expected: &[
                "Arnica Montana",
                "Arnica Montana",
                "Belladonna",
                "Nux Vomica",
                "Sulphur",
                "Calendula Officinalis",
            ],
        },
        GoldenCase {
            id: "any-potency",
            name_query: Some("arnica"),
            potency_query: Some("Any"),
            expected: &["Arnica Montana", "Arnica Montana"],
        },
        GoldenCase {
            id: "exact-potency-12c",
            name_query: None,
            potency_query: Some("12C"),
            expected: &["Belladonna"],
        },
        GoldenCase {
            id: "no-substring-potency",
            name_query: None,
            potency_query: Some("2C"),
            expected: &["Nux Vomica"],
        },
        GoldenCase {
            id: "potency-case-insensitive",
            name_query: None,
            potency_query: Some("1m"),
            expected: &["Sulphur"],
        },
        GoldenCase {
            id: "alternate-name",
            name_query: Some("leopard"),
            potency_query: None,
            expected: &["Arnica Montana", "Arnica Montana"],
        },
        GoldenCase {
            id: "alternate-name-with-potency",
            name_query: Some("LEOPARD"),
            potency_query: Some("200C"),
            expected: &["Arnica Montana"],
        },
        GoldenCase {
            id: "second-alternate",
            name_query: Some("tobacco"),
            potency_query: None,
            expected: &["Arnica Montana"],
        },
        GoldenCase {
            id: "name-and-wrong-potency",
            name_query: Some("arnica"),
            potency_query: Some("12C"),
            expected: &[],
        },
        GoldenCase {
            id: "mid-word-substring",
            name_query: Some("donna"),
            potency_query: None,
            expected: &["Belladonna"],
        },
        GoldenCase {
            id: "mother-tincture",
            name_query: Some("marigold"),
            potency_query: Some("q"),
            expected: &["Calendula Officinalis"],
        },
        GoldenCase {
            id: "no-match",
            name_query: Some("chamomilla"),
            potency_query: None,
            expected: &[],
        },
    ]
}

#[test]
fn test_golden_cases() {
    let store = inventory();

    for case in get_golden_cases() {
        let names: Vec<String> = store
            .search(case.name_query, case.potency_query)
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();

        assert_eq!(names, case.expected, "Case {}: result mismatch", case.id);
    }
}

#[test]
fn test_exact_potency_excludes_longer_labels() {
    let store = MedicineStore::new();
    store
        .seed([medicine("Sulphur", "12C", &[]), medicine("Sulphur", "200C", &[])])
        .unwrap();

    let results = store.search(None, Some("12C")).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].potency, "12C");
}
