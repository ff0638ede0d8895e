//! Drug interaction checks.
//!
//! No interaction data source exists yet. Rather than inventing a severity,
//! every check reports [`InteractionStatus::Unimplemented`] and carries no
//! severity at all.

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{errors::Error, family::FamilyMedication};

pub const FEATURE: &str = "drug-interactions";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    Unimplemented,
}

#[derive(new, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionReport {
    pub drug1: String,
    pub drug2: String,
    pub status: InteractionStatus,
    pub feature: String,
    pub severity: Option<String>,
    pub description: String,
}

pub fn check_interaction(drug1: &str, drug2: &str) -> Result<InteractionReport, Error> {
    let (drug1, drug2) = (drug1.trim(), drug2.trim());
    if drug1.is_empty() || drug2.is_empty() {
        return Err(Error::invalid_input("Two drug names are required"));
    }

    Ok(InteractionReport::new(
        drug1.to_string(),
        drug2.to_string(),
        InteractionStatus::Unimplemented,
        FEATURE.to_string(),
        None,
        format!("Interaction data for {drug1} and {drug2} is not available yet"),
    ))
}

/// Outcome of checking every medication recorded for the family
#[derive(new, Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FamilyInteractionReport {
    pub status: InteractionStatus,
    pub feature: String,
    pub drugs_checked: usize,
    pub interactions: Vec<InteractionReport>,
}

pub fn check_family(medications: &[FamilyMedication]) -> FamilyInteractionReport {
    let mut drug_ids: Vec<&str> = medications.iter().map(|m| m.drug_id.as_str()).collect();
    drug_ids.sort_unstable();
    drug_ids.dedup();

    FamilyInteractionReport::new(
        InteractionStatus::Unimplemented,
        FEATURE.to_string(),
        drug_ids.len(),
        Vec::new(),
    )
}
