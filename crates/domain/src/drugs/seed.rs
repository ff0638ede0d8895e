use crate::errors::Error;

use super::{record::NewDrug, store::RecordStore};

/// Parses a drug export: a JSON array of insert payloads
pub fn parse_seed(bytes: &[u8]) -> Result<Vec<NewDrug>, Error> {
    Ok(serde_json::from_slice(bytes)?)
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SeedSummary {
    pub removed: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// Replaces the whole catalogue with `drugs`.
///
/// Every entry is validated before the table is cleared, so a bad export
/// leaves the existing catalogue in place. Repeated names are skipped.
pub async fn reseed(store: &dyn RecordStore, drugs: Vec<NewDrug>) -> Result<SeedSummary, Error> {
    for drug in &drugs {
        drug.clone().into_record(String::new())?;
    }

    let mut summary = SeedSummary {
        removed: store.clear().await?,
        ..Default::default()
    };

    for drug in drugs {
        let name = drug.name.clone();
        match store.insert(drug).await {
            Ok(_) => summary.inserted += 1,
            Err(Error::Uniqueness { .. }) => {
                tracing::warn!("Skipping duplicate drug {}", name);
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Seeded {} drugs ({} removed, {} skipped)",
        summary.inserted,
        summary.removed,
        summary.skipped
    );

    Ok(summary)
}
