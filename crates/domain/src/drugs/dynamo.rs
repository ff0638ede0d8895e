use std::{collections::HashMap, env, sync::Arc, time::Duration};

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::DisplayErrorContext,
    types::{AttributeValue, DeleteRequest, KeysAndAttributes, WriteRequest},
    Client,
};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::errors::Error;

use super::{
    codec::{decode_list, encode_list},
    filter::QueryFilter,
    record::{Category, DrugRecord, NewDrug},
    store::{sorted_categories, RecordStore},
};

pub(crate) type Item = HashMap<String, AttributeValue>;

const KEY_ATTRIBUTE: &str = "name";
const BATCH_GET_LIMIT: usize = 100;
const BATCH_WRITE_LIMIT: usize = 25;
const BACKOFF_BASE_MS: u64 = 50;
const BACKOFF_MAX_ROUND: u32 = 5;

/// Table layout: keyed by `name`, list columns held as JSON text
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDrug {
    name: String,
    name_lower: String,
    id: String,
    category: Category,
    combination: String,
    strength: String,
    dosage_form: String,
    manufacturer: String,
    price: f64,
    side_effects: String,
    alternatives: String,
}

impl StoredDrug {
    fn encode(record: &DrugRecord) -> Result<Self, Error> {
        Ok(Self {
            name: record.name.clone(),
            name_lower: record.name.to_lowercase(),
            id: record.id.clone(),
            category: record.category,
            combination: record.combination.clone(),
            strength: record.strength.clone(),
            dosage_form: record.dosage_form.clone(),
            manufacturer: record.manufacturer.clone(),
            price: record.price,
            side_effects: encode_list(&record.side_effects)?,
            alternatives: encode_list(&record.alternatives)?,
        })
    }
}

impl TryFrom<StoredDrug> for DrugRecord {
    type Error = Error;

    fn try_from(stored: StoredDrug) -> Result<Self, Self::Error> {
        Ok(Self {
            side_effects: decode_list(&stored.side_effects)?,
            alternatives: decode_list(&stored.alternatives)?,
            id: stored.id,
            name: stored.name,
            category: stored.category,
            combination: stored.combination,
            strength: stored.strength,
            dosage_form: stored.dosage_form,
            manufacturer: stored.manufacturer,
            price: stored.price,
        })
    }
}

fn to_record(item: Item) -> Result<DrugRecord, Error> {
    let stored: StoredDrug = serde_dynamo::from_item(item).map_err(Error::persistence)?;
    stored.try_into()
}

pub(crate) fn key_for(attribute: &str, value: &str) -> Item {
    HashMap::from([(attribute.to_string(), AttributeValue::S(value.to_string()))])
}

fn category_of(item: &Item) -> Result<Category, Error> {
    let value = item
        .get("category")
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| Error::persistence("Drug item without category"))?;

    value
        .parse()
        .map_err(|_| Error::persistence(format!("Unknown category {value}")))
}

/// Wait before resubmitting unprocessed batch entries: 50ms doubling per round, capped
pub(crate) fn backoff_delay(round: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS * 2u64.pow(round.min(BACKOFF_MAX_ROUND)))
}

/// Scan request parameters derived from a filter
#[derive(Debug, Default)]
pub(crate) struct ScanSpec {
    filter_expression: Option<String>,
    names: Option<HashMap<String, String>>,
    values: Option<HashMap<String, AttributeValue>>,
    projection: Option<String>,
}

impl ScanSpec {
    pub(crate) fn all() -> Self {
        Self::default()
    }

    fn from_filter(filter: &QueryFilter) -> Self {
        let mut clauses = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        if let Some(category) = filter.category {
            clauses.push("#category = :category".to_string());
            names.insert("#category".to_string(), "category".to_string());
            values.insert(
                ":category".to_string(),
                AttributeValue::S(category.as_str().to_string()),
            );
        }

        if !filter.name_patterns.is_empty() {
            names.insert("#nameLower".to_string(), "nameLower".to_string());
            let alternatives: Vec<String> = filter
                .name_patterns
                .iter()
                .enumerate()
                .map(|(i, pattern)| {
                    let placeholder = format!(":name{i}");
                    values.insert(placeholder.clone(), AttributeValue::S(pattern.to_lowercase()));
                    format!("contains(#nameLower, {placeholder})")
                })
                .collect();
            clauses.push(format!("({})", alternatives.join(" OR ")));
        }

        if clauses.is_empty() {
            return Self::default();
        }

        Self {
            filter_expression: Some(clauses.join(" AND ")),
            names: Some(names),
            values: Some(values),
            projection: None,
        }
    }

    /// Items whose `attribute` equals `value`
    pub(crate) fn matching(attribute: &str, value: &str) -> Self {
        Self {
            filter_expression: Some("#attr = :value".to_string()),
            names: Some(HashMap::from([("#attr".to_string(), attribute.to_string())])),
            values: Some(HashMap::from([(
                ":value".to_string(),
                AttributeValue::S(value.to_string()),
            )])),
            projection: None,
        }
    }

    pub(crate) fn projecting(attribute: &str) -> Self {
        Self {
            names: Some(HashMap::from([("#p".to_string(), attribute.to_string())])),
            projection: Some("#p".to_string()),
            ..Default::default()
        }
    }
}

pub struct DynamoStore {
    client: Client,
    table: String,
}

impl DynamoStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

pub(crate) async fn scan(client: &Client, table: &str, spec: &ScanSpec) -> Result<Vec<Item>, Error> {
    let mut items = Vec::new();
    let mut start_key = None;

    loop {
        let output = client
            .scan()
            .table_name(table)
            .set_filter_expression(spec.filter_expression.clone())
            .set_expression_attribute_names(spec.names.clone())
            .set_expression_attribute_values(spec.values.clone())
            .set_projection_expression(spec.projection.clone())
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|e| Error::persistence(DisplayErrorContext(e)))?;

        items.extend(output.items().iter().cloned());

        start_key = output.last_evaluated_key().cloned();
        if start_key.is_none() {
            break;
        }
    }

    tracing::debug!("Scanned {} items from {}", items.len(), table);
    Ok(items)
}

async fn write_batch(client: &Client, table: &str, mut requests: Vec<WriteRequest>) -> Result<(), Error> {
    let mut round = 0;

    while !requests.is_empty() {
        let output = client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(|e| Error::persistence(DisplayErrorContext(e)))?;

        requests = output
            .unprocessed_items()
            .and_then(|unprocessed| unprocessed.get(table))
            .cloned()
            .unwrap_or_default();

        if !requests.is_empty() {
            let delay = backoff_delay(round);
            tracing::warn!(
                "Resubmitting {} unprocessed writes after {}ms",
                requests.len(),
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            round += 1;
        }
    }

    Ok(())
}

/// Deletes every item in `items` by its `key_attribute`, in batches
pub(crate) async fn delete_items(
    client: &Client,
    table: &str,
    key_attribute: &str,
    items: &[Item],
) -> Result<(), Error> {
    for chunk in items.chunks(BATCH_WRITE_LIMIT) {
        let requests = chunk
            .iter()
            .map(|item| {
                let key = item
                    .get(key_attribute)
                    .cloned()
                    .ok_or_else(|| Error::persistence(format!("Item without {key_attribute}")))?;
                let delete = DeleteRequest::builder()
                    .key(key_attribute, key)
                    .build()
                    .map_err(Error::persistence)?;
                Ok(WriteRequest::builder().delete_request(delete).build())
            })
            .collect::<Result<Vec<_>, Error>>()?;

        write_batch(client, table, requests).await?;
    }

    Ok(())
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn find(&self, filter: &QueryFilter) -> Result<Vec<DrugRecord>, Error> {
        let records = scan(&self.client, &self.table, &ScanSpec::from_filter(filter))
            .await?
            .into_iter()
            .map(to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(filter.order_and_limit(records))
    }

    async fn find_by_names(&self, names: &[String]) -> Result<Vec<DrugRecord>, Error> {
        let mut unique: Vec<&String> = names.iter().collect();
        unique.sort();
        unique.dedup();

        let mut records = Vec::new();
        for chunk in unique.chunks(BATCH_GET_LIMIT) {
            let keys = chunk.iter().map(|name| key_for(KEY_ATTRIBUTE, name)).collect();
            let mut pending = Some(
                KeysAndAttributes::builder()
                    .set_keys(Some(keys))
                    .build()
                    .map_err(Error::persistence)?,
            );

            let mut round = 0;
            while let Some(request) = pending.take() {
                if round > 0 {
                    tokio::time::sleep(backoff_delay(round - 1)).await;
                }
                round += 1;

                let output = self
                    .client
                    .batch_get_item()
                    .request_items(&self.table, request)
                    .send()
                    .await
                    .map_err(|e| Error::persistence(DisplayErrorContext(e)))?;

                if let Some(items) = output.responses().and_then(|r| r.get(&self.table)) {
                    for item in items {
                        records.push(to_record(item.clone())?);
                    }
                }

                pending = output
                    .unprocessed_keys()
                    .and_then(|unprocessed| unprocessed.get(&self.table))
                    .filter(|request| !request.keys().is_empty())
                    .cloned();
            }
        }

        Ok(records)
    }

    async fn distinct_categories(&self) -> Result<Vec<Category>, Error> {
        let items = scan(&self.client, &self.table, &ScanSpec::projecting("category")).await?;
        let categories = items
            .iter()
            .map(category_of)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sorted_categories(categories))
    }

    async fn insert(&self, drug: NewDrug) -> Result<DrugRecord, Error> {
        let record = drug.into_record(Ulid::new().to_string())?;
        let item: Item =
            serde_dynamo::to_item(StoredDrug::encode(&record)?).map_err(Error::persistence)?;

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#name)")
            .expression_attribute_names("#name", KEY_ATTRIBUTE)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception())
                {
                    Error::Uniqueness {
                        field: KEY_ATTRIBUTE.to_string(),
                    }
                } else {
                    Error::persistence(DisplayErrorContext(e))
                }
            })?;

        Ok(record)
    }

    async fn clear(&self) -> Result<usize, Error> {
        let items = scan(&self.client, &self.table, &ScanSpec::projecting(KEY_ATTRIBUTE)).await?;
        let removed = items.len();

        delete_items(&self.client, &self.table, KEY_ATTRIBUTE, &items).await?;

        tracing::info!("Cleared {} drugs from {}", removed, self.table);
        Ok(removed)
    }
}

pub fn init_store(client: Client) -> Arc<dyn RecordStore> {
    let table = env::var("DYNAMODB_DRUGS_TABLE").unwrap_or("drugreco-drugs".to_string());

    Arc::new(DynamoStore::new(client, table))
}
