use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::record::{Category, DrugRecord};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Price,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct OrderBy {
    pub field: SortField,
    pub direction: Direction,
}

impl OrderBy {
    pub const fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }

    fn compare(&self, a: &DrugRecord, b: &DrugRecord) -> Ordering {
        let ordering = match self.field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Price => a.price.total_cmp(&b.price),
        };

        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Store-agnostic description of a drug lookup
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    /// Exact category match
    pub category: Option<Category>,
    /// Case-insensitive substrings of the name; a record matches if any is contained.
    /// Empty means no name constraint.
    pub name_patterns: Vec<String>,
    pub ordering: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl QueryFilter {
    pub fn is_unconstrained(&self) -> bool {
        self.category.is_none() && self.name_patterns.is_empty()
    }

    pub fn matches(&self, record: &DrugRecord) -> bool {
        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }

        if self.name_patterns.is_empty() {
            return true;
        }

        let name = record.name.to_lowercase();
        self.name_patterns
            .iter()
            .any(|pattern| name.contains(&pattern.to_lowercase()))
    }

    /// Sorts and truncates records that already satisfy the filter
    pub fn order_and_limit(&self, mut records: Vec<DrugRecord>) -> Vec<DrugRecord> {
        if let Some(order_by) = self.ordering {
            records.sort_by(|a, b| order_by.compare(a, b));
        }
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
        records
    }

    /// Full in-process evaluation: match, order, limit
    pub fn apply<'a, I>(&self, records: I) -> Vec<DrugRecord>
    where
        I: IntoIterator<Item = &'a DrugRecord>,
    {
        let matched = records
            .into_iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect();

        self.order_and_limit(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, category: Category, price: f64) -> DrugRecord {
        DrugRecord {
            id: name.to_string(),
            name: name.to_string(),
            category,
            combination: String::new(),
            strength: String::new(),
            dosage_form: "Tablet".to_string(),
            manufacturer: String::new(),
            price,
            side_effects: Vec::new(),
            alternatives: Vec::new(),
        }
    }

    fn catalogue() -> Vec<DrugRecord> {
        vec![
            record("Paracetamol 500mg", Category::PainRelief, 35.0),
            record("Dolo 650", Category::PainRelief, 42.0),
            record("Metformin 500mg", Category::Diabetes, 65.0),
            record("Glimepiride 2mg", Category::Diabetes, 120.0),
        ]
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let names: Vec<_> = QueryFilter::default()
            .apply(&catalogue())
            .into_iter()
            .map(|r| r.name)
            .collect();

        assert_eq!(
            names,
            ["Paracetamol 500mg", "Dolo 650", "Metformin 500mg", "Glimepiride 2mg"]
        );
    }

    #[test]
    fn name_patterns_are_or_matched_case_insensitively() {
        let filter = QueryFilter {
            name_patterns: vec!["PARACETAMOL".to_string(), "dolo".to_string()],
            ..Default::default()
        };
        let found = filter.apply(&catalogue());

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.category == Category::PainRelief));
    }

    #[test]
    fn category_and_name_are_both_required() {
        let filter = QueryFilter {
            category: Some(Category::Diabetes),
            name_patterns: vec!["500".to_string()],
            ..Default::default()
        };
        let found = filter.apply(&catalogue());

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Metformin 500mg");
    }

    #[test]
    fn ordering_then_limit() {
        let filter = QueryFilter {
            ordering: Some(OrderBy::new(SortField::Price, Direction::Descending)),
            limit: Some(2),
            ..Default::default()
        };
        let prices: Vec<_> = filter.apply(&catalogue()).iter().map(|r| r.price).collect();

        assert_eq!(prices, [120.0, 65.0]);
    }

    #[test]
    fn order_by_name_ignores_case() {
        let mut records = catalogue();
        records.push(record("aspirin", Category::PainRelief, 10.0));

        let filter = QueryFilter {
            ordering: Some(OrderBy::new(SortField::Name, Direction::Ascending)),
            ..Default::default()
        };
        let found = filter.apply(&records);

        assert_eq!(found[0].name, "aspirin");
        assert_eq!(found[1].name, "Dolo 650");
    }
}
