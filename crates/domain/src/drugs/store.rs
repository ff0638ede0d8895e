use async_trait::async_trait;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::errors::Error;

use super::{
    filter::{OrderBy, QueryFilter},
    record::{Category, DrugRecord, NewDrug},
};

/// Persistence collaborator for drug records.
///
/// Implementations never retry; errors reach the caller unchanged.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, filter: &QueryFilter) -> Result<Vec<DrugRecord>, Error>;

    async fn find_by_names(&self, names: &[String]) -> Result<Vec<DrugRecord>, Error>;

    /// Categories present in the store, sorted by name
    async fn distinct_categories(&self) -> Result<Vec<Category>, Error>;

    async fn insert(&self, drug: NewDrug) -> Result<DrugRecord, Error>;

    /// Removes every record, returning how many were deleted
    async fn clear(&self) -> Result<usize, Error>;

    async fn all(&self) -> Result<Vec<DrugRecord>, Error> {
        self.find(&QueryFilter::default()).await
    }

    async fn get(&self, id: &str) -> Result<DrugRecord, Error> {
        self.all()
            .await?
            .into_iter()
            .find(|record| record.id == id)
            .ok_or_else(|| Error::not_found("Drug", id))
    }

    async fn top(&self, n: usize, order_by: OrderBy) -> Result<Vec<DrugRecord>, Error> {
        let filter = QueryFilter {
            ordering: Some(order_by),
            limit: Some(n),
            ..Default::default()
        };
        self.find(&filter).await
    }
}

pub(crate) fn sorted_categories(categories: impl IntoIterator<Item = Category>) -> Vec<Category> {
    let mut categories: Vec<Category> = categories.into_iter().collect();
    categories.sort_by_key(|c| c.as_str());
    categories.dedup();
    categories
}

/// Insertion-ordered store held in process memory
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<DrugRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(&self, filter: &QueryFilter) -> Result<Vec<DrugRecord>, Error> {
        let records = self.records.read().await;
        Ok(filter.apply(records.iter()))
    }

    async fn find_by_names(&self, names: &[String]) -> Result<Vec<DrugRecord>, Error> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| names.contains(&record.name))
            .cloned()
            .collect())
    }

    async fn distinct_categories(&self) -> Result<Vec<Category>, Error> {
        let records = self.records.read().await;
        Ok(sorted_categories(records.iter().map(|r| r.category)))
    }

    async fn insert(&self, drug: NewDrug) -> Result<DrugRecord, Error> {
        let record = drug.into_record(Ulid::new().to_string())?;

        let mut records = self.records.write().await;
        if records.iter().any(|r| r.name == record.name) {
            return Err(Error::Uniqueness {
                field: "name".to_string(),
            });
        }
        records.push(record.clone());

        Ok(record)
    }

    async fn clear(&self) -> Result<usize, Error> {
        let mut records = self.records.write().await;
        let removed = records.len();
        records.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drugs::{
        filter::{Direction, SortField},
        resolver::build_filter,
    };

    fn new_drug(name: &str, category: &str, price: f64) -> NewDrug {
        NewDrug {
            name: name.to_string(),
            category: category.to_string(),
            combination: String::new(),
            strength: String::new(),
            dosage_form: "Tablet".to_string(),
            manufacturer: String::new(),
            price,
            side_effects: vec!["Nausea".to_string()],
            alternatives: Vec::new(),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (name, category, price) in [
            ("Ibuprofen 400mg", "Pain Relief", 30.0),
            ("Diclofenac 50mg", "Pain Relief", 48.0),
            ("Metformin 500mg", "Diabetes", 65.0),
            ("Atorvastatin 20mg", "Cardiovascular", 145.0),
        ] {
            store.insert(new_drug(name, category, price)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn faceted_search_narrows_by_category_and_name() {
        let store = seeded().await;
        let filter = build_filter(Some("ibu"), Some("Pain Relief")).unwrap();

        let found = store.find(&filter).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ibuprofen 400mg");
    }

    #[tokio::test]
    async fn insert_assigns_id_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let record = store
            .insert(new_drug("Cetirizine 10mg", "Antiallergic", 52.0))
            .await
            .unwrap();

        assert!(Ulid::from_string(&record.id).is_ok());
        assert!(matches!(
            store.insert(new_drug("Cetirizine 10mg", "Antiallergic", 55.0)).await,
            Err(Error::Uniqueness { .. })
        ));
        assert_eq!(store.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_insert_leaves_store_untouched() {
        let store = MemoryStore::new();

        assert!(store.insert(new_drug("Mystery", "Vitamins", 1.0)).await.is_err());
        assert!(store.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn top_orders_and_truncates() {
        let store = seeded().await;

        let top = store
            .top(2, OrderBy::new(SortField::Price, Direction::Descending))
            .await
            .unwrap();
        let names: Vec<_> = top.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, ["Atorvastatin 20mg", "Metformin 500mg"]);
    }

    #[tokio::test]
    async fn distinct_categories_are_sorted() {
        let store = seeded().await;

        let categories = store.distinct_categories().await.unwrap();

        assert_eq!(
            categories,
            [Category::Cardiovascular, Category::Diabetes, Category::PainRelief]
        );
    }

    #[tokio::test]
    async fn find_by_names_skips_unknown() {
        let store = seeded().await;
        let names = vec!["Metformin 500mg".to_string(), "Glycomet".to_string()];

        let found = store.find_by_names(&names).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].category, Category::Diabetes);
    }

    #[tokio::test]
    async fn get_looks_up_by_id() {
        let store = seeded().await;
        let metformin = store.find_by_names(&["Metformin 500mg".to_string()]).await.unwrap();

        let found = store.get(&metformin[0].id).await.unwrap();

        assert_eq!(found.name, "Metformin 500mg");
        assert!(matches!(store.get("missing").await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn clear_reports_removed_count() {
        let store = seeded().await;

        assert_eq!(store.clear().await.unwrap(), 4);
        assert!(store.all().await.unwrap().is_empty());
    }
}
