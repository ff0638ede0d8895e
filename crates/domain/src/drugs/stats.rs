use std::collections::HashMap;

use derive_new::new;
use serde::{Deserialize, Serialize};

use super::{
    record::{Category, DrugRecord},
    store::sorted_categories,
};

#[derive(new, Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: Category,
    pub count: usize,
    pub avg_price: f64,
}

/// Record count and mean price per category, sorted by category name
pub fn summarize(records: &[DrugRecord]) -> Vec<CategoryStat> {
    let mut totals: HashMap<Category, (usize, f64)> = HashMap::new();
    for record in records {
        let entry = totals.entry(record.category).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.price;
    }

    sorted_categories(totals.keys().copied())
        .into_iter()
        .map(|category| {
            let (count, sum) = totals[&category];
            CategoryStat::new(category, count, sum / count as f64)
        })
        .collect()
}
