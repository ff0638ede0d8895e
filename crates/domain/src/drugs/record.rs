use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Therapeutic class of a drug
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum Category {
    Diabetes,
    #[serde(rename = "Pain Relief")]
    PainRelief,
    Antibiotics,
    Hypertension,
    Cardiovascular,
    Antiallergic,
    Gastrointestinal,
    Supplements,
    Thyroid,
    #[serde(rename = "Sleep Aid")]
    SleepAid,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Diabetes,
        Category::PainRelief,
        Category::Antibiotics,
        Category::Hypertension,
        Category::Cardiovascular,
        Category::Antiallergic,
        Category::Gastrointestinal,
        Category::Supplements,
        Category::Thyroid,
        Category::SleepAid,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::PainRelief => "Pain Relief",
            Self::Antibiotics => "Antibiotics",
            Self::Hypertension => "Hypertension",
            Self::Cardiovascular => "Cardiovascular",
            Self::Antiallergic => "Antiallergic",
            Self::Gastrointestinal => "Gastrointestinal",
            Self::Supplements => "Supplements",
            Self::Thyroid => "Thyroid",
            Self::SleepAid => "Sleep Aid",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::invalid_input("Invalid category parameter"))
    }
}

/// A marketed medication
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrugRecord {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub combination: String,
    pub strength: String,
    pub dosage_form: String,
    pub manufacturer: String,
    pub price: f64,
    pub side_effects: Vec<String>,
    pub alternatives: Vec<String>,
}

/// Insert payload, as posted by clients and found in seed exports
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewDrug {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub combination: String,
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub dosage_form: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl NewDrug {
    /// Checks required fields and turns the payload into a record with the given id
    pub fn into_record(self, id: String) -> Result<DrugRecord, Error> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input("Name and category are required fields."));
        }

        let category: Category = self.category.parse()?;

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::invalid_input("Price must be a non-negative number"));
        }

        Ok(DrugRecord {
            id,
            name: name.to_string(),
            category,
            combination: self.combination,
            strength: self.strength,
            dosage_form: self.dosage_form,
            manufacturer: self.manufacturer,
            price: self.price,
            side_effects: self.side_effects,
            alternatives: self.alternatives,
        })
    }
}
