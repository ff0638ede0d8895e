//! Free-text query interpretation.
//!
//! A phrase such as "cheap diabetes tablets" is mapped onto a [`QueryFilter`]
//! by walking three fixed rule tables in order:
//!
//! 1. category rules, first match wins
//! 2. price modifiers, first match wins, appended to the interpretation
//! 3. drug-name overrides, first match wins, replacing the interpretation and
//!    dropping any category picked in step 1
//!
//! If nothing produced an interpretation the raw text becomes a name search.
//! Matching is plain substring containment on the lowercased text, so
//! "painful" triggers the "pain" rule.

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

use super::{
    filter::{Direction, OrderBy, QueryFilter, SortField},
    record::Category,
};

/// Result size used by the price modifiers
pub const PRICE_SORTED_LIMIT: usize = 10;

struct CategoryRule {
    category: Category,
    keywords: &'static [&'static str],
    interpretation: &'static str,
}

struct PriceRule {
    keywords: &'static [&'static str],
    direction: Direction,
    suffix: &'static str,
}

struct NameRule {
    keywords: &'static [&'static str],
    patterns: &'static [&'static str],
    interpretation: &'static str,
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Diabetes,
        keywords: &["diabetes", "diabetic"],
        interpretation: "Searching for diabetes medications",
    },
    CategoryRule {
        category: Category::PainRelief,
        keywords: &["pain", "ache", "relief"],
        interpretation: "Searching for pain relief medications",
    },
    CategoryRule {
        category: Category::Antibiotics,
        keywords: &["antibiotic", "infection"],
        interpretation: "Searching for antibiotics",
    },
    CategoryRule {
        category: Category::Hypertension,
        keywords: &["hypertension", "blood pressure", "bp"],
        interpretation: "Searching for blood pressure medications",
    },
    CategoryRule {
        category: Category::Cardiovascular,
        keywords: &["heart", "cardiac", "cardiovascular"],
        interpretation: "Searching for cardiovascular medications",
    },
    CategoryRule {
        category: Category::Antiallergic,
        keywords: &["allergy", "allergic"],
        interpretation: "Searching for allergy medications",
    },
    CategoryRule {
        category: Category::Gastrointestinal,
        keywords: &["stomach", "gastro", "acid"],
        interpretation: "Searching for gastrointestinal medications",
    },
];

const PRICE_RULES: &[PriceRule] = &[
    PriceRule {
        keywords: &["cheap", "affordable", "low cost"],
        direction: Direction::Ascending,
        suffix: " - sorted by lowest price",
    },
    PriceRule {
        keywords: &["expensive", "high cost", "premium"],
        direction: Direction::Descending,
        suffix: " - sorted by highest price",
    },
];

const NAME_RULES: &[NameRule] = &[
    NameRule {
        keywords: &["paracetamol", "acetaminophen"],
        patterns: &["paracetamol", "dolo"],
        interpretation: "Searching for paracetamol-based medications",
    },
    NameRule {
        keywords: &["metformin"],
        patterns: &["metformin"],
        interpretation: "Searching for metformin-based medications",
    },
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

#[derive(new, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Interpretation {
    pub interpretation: String,
    pub filter: QueryFilter,
}

pub fn interpret(text: &str) -> Result<Interpretation, Error> {
    if text.is_empty() {
        return Err(Error::invalid_input("Query is required"));
    }

    let lower = text.to_lowercase();
    let mut filter = QueryFilter::default();
    let mut interpretation = String::new();

    if let Some(rule) = CATEGORY_RULES
        .iter()
        .find(|rule| contains_any(&lower, rule.keywords))
    {
        filter.category = Some(rule.category);
        interpretation.push_str(rule.interpretation);
    }

    if let Some(rule) = PRICE_RULES
        .iter()
        .find(|rule| contains_any(&lower, rule.keywords))
    {
        filter.ordering = Some(OrderBy::new(SortField::Price, rule.direction));
        filter.limit = Some(PRICE_SORTED_LIMIT);
        interpretation.push_str(rule.suffix);
    }

    // Replaces the category as well as the interpretation. Ordering and limit survive.
    if let Some(rule) = NAME_RULES
        .iter()
        .find(|rule| contains_any(&lower, rule.keywords))
    {
        filter.category = None;
        filter.name_patterns = rule.patterns.iter().map(|p| p.to_string()).collect();
        interpretation = rule.interpretation.to_string();
    }

    if interpretation.is_empty() {
        filter.name_patterns = vec![text.to_string()];
        interpretation = format!("General search for \"{text}\"");
    }

    Ok(Interpretation::new(interpretation, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TRIGGER_WORDS: &[&str] = &[
        "diabetes", "diabetic", "pain", "ache", "relief", "antibiotic", "infection",
        "hypertension", "blood pressure", "bp", "heart", "cardiac", "cardiovascular",
        "allergy", "allergic", "stomach", "gastro", "acid", "cheap", "affordable", "low cost",
        "expensive", "high cost", "premium", "paracetamol", "acetaminophen", "metformin",
    ];

    fn diabetes_phrase() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just("diabetes"), Just("Diabetic"), Just("DIABETES")],
            "[a-z ]{0,12}",
            "[a-z ]{0,12}",
        )
            .prop_map(|(keyword, before, after)| format!("{before}{keyword}{after}"))
            .prop_filter("no drug-name override", |text| {
                let lower = text.to_lowercase();
                !contains_any(&lower, &["paracetamol", "acetaminophen", "metformin"])
            })
    }

    fn plain_phrase() -> impl Strategy<Value = String> {
        "[a-z0-9 ]{1,24}".prop_filter("no rule keywords", |text| !contains_any(text, TRIGGER_WORDS))
    }

    proptest! {
        #[test]
        fn prop_diabetes_keyword_selects_category(text in diabetes_phrase()) {
            let result = interpret(&text).unwrap();
            prop_assert_eq!(result.filter.category, Some(Category::Diabetes));
        }

        #[test]
        fn prop_cheap_sorts_ascending_with_limit(prefix in "[a-z ]{0,16}", suffix in "[a-z ]{0,16}") {
            let text = format!("{prefix}cheap{suffix}");
            let result = interpret(&text).unwrap();
            prop_assert_eq!(
                result.filter.ordering,
                Some(OrderBy::new(SortField::Price, Direction::Ascending))
            );
            prop_assert_eq!(result.filter.limit, Some(PRICE_SORTED_LIMIT));
        }

        #[test]
        fn prop_unmatched_text_falls_back_to_name_search(text in plain_phrase()) {
            let result = interpret(&text).unwrap();
            prop_assert_eq!(&result.filter.name_patterns, &vec![text.clone()]);
            prop_assert_eq!(result.interpretation, format!("General search for \"{text}\""));
            prop_assert_eq!(result.filter.category, None);
        }

        #[test]
        fn prop_interpretation_is_deterministic(text in "[a-zA-Z ]{1,32}") {
            prop_assert_eq!(interpret(&text).unwrap(), interpret(&text).unwrap());
        }
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(interpret(""), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn whitespace_only_text_falls_back_to_general_search() {
        let result = interpret("  ").unwrap();

        assert_eq!(result.interpretation, "General search for \"  \"");
        assert_eq!(result.filter.name_patterns, vec!["  ".to_string()]);
        assert_eq!(result.filter.category, None);
    }

    #[test]
    fn category_rule_sets_interpretation() {
        let result = interpret("something for my allergy").unwrap();

        assert_eq!(result.filter.category, Some(Category::Antiallergic));
        assert_eq!(result.interpretation, "Searching for allergy medications");
        assert!(result.filter.name_patterns.is_empty());
        assert_eq!(result.filter.ordering, None);
    }

    #[test]
    fn earlier_category_rule_wins() {
        // "pain" (Pain Relief) is listed before "heart" (Cardiovascular)
        let result = interpret("heart pain").unwrap();
        assert_eq!(result.filter.category, Some(Category::PainRelief));
    }

    #[test]
    fn substring_matching_is_not_word_bounded() {
        let result = interpret("painful knees").unwrap();
        assert_eq!(result.filter.category, Some(Category::PainRelief));
    }

    #[test]
    fn price_modifier_extends_category_interpretation() {
        let result = interpret("Expensive heart medicine").unwrap();

        assert_eq!(result.filter.category, Some(Category::Cardiovascular));
        assert_eq!(
            result.interpretation,
            "Searching for cardiovascular medications - sorted by highest price"
        );
        assert_eq!(
            result.filter.ordering,
            Some(OrderBy::new(SortField::Price, Direction::Descending))
        );
        assert_eq!(result.filter.limit, Some(10));
    }

    #[test]
    fn price_modifier_alone_suppresses_fallback() {
        let result = interpret("affordable").unwrap();

        assert_eq!(result.interpretation, " - sorted by lowest price");
        assert!(result.filter.name_patterns.is_empty());
        assert!(result.filter.category.is_none());
    }

    #[test]
    fn paracetamol_overrides_category() {
        let result = interpret("paracetamol for diabetes").unwrap();

        assert_eq!(result.interpretation, "Searching for paracetamol-based medications");
        assert_eq!(result.filter.category, None);
        assert_eq!(result.filter.name_patterns, vec!["paracetamol", "dolo"]);
    }

    #[test]
    fn name_override_keeps_price_ordering() {
        let result = interpret("cheap acetaminophen").unwrap();

        assert_eq!(result.interpretation, "Searching for paracetamol-based medications");
        assert_eq!(
            result.filter.ordering,
            Some(OrderBy::new(SortField::Price, Direction::Ascending))
        );
        assert_eq!(result.filter.limit, Some(10));
    }

    #[test]
    fn metformin_override() {
        let result = interpret("Metformin").unwrap();

        assert_eq!(result.interpretation, "Searching for metformin-based medications");
        assert_eq!(result.filter.name_patterns, vec!["metformin"]);
    }

    #[test]
    fn fallback_keeps_original_casing() {
        let result = interpret("Zyrtec").unwrap();

        assert_eq!(result.interpretation, "General search for \"Zyrtec\"");
        assert_eq!(result.filter.name_patterns, vec!["Zyrtec"]);
    }
}
