use serde::{Deserialize, Serialize};

use crate::{drugs::DrugRecord, errors::Error};

const MAX_AGE: u32 = 150;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    Admin,
    #[default]
    Member,
}

/// A household member whose medications are tracked
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    pub age: Option<u32>,
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub role: FamilyRole,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewFamilyMember {
    pub name: String,
    pub age: Option<u32>,
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub role: FamilyRole,
}

impl NewFamilyMember {
    pub fn into_member(self, id: String) -> Result<FamilyMember, Error> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input("Name is required"));
        }
        if self.age.is_some_and(|age| age > MAX_AGE) {
            return Err(Error::invalid_input("Age is out of range"));
        }

        Ok(FamilyMember {
            id,
            name: name.to_string(),
            age: self.age,
            allergies: self.allergies,
            conditions: self.conditions,
            emergency_contact: self.emergency_contact,
            emergency_phone: self.emergency_phone,
            role: self.role,
        })
    }
}

/// A drug taken by one family member
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMedication {
    pub id: String,
    pub family_member_id: String,
    pub drug_id: String,
    pub dosage: String,
    pub frequency: String,
    pub notes: String,
    pub cost: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMedication {
    pub family_member_id: String,
    pub drug_id: String,
    pub dosage: String,
    pub frequency: String,
    pub notes: String,
    pub cost: Option<f64>,
}

impl NewMedication {
    pub fn validate(&self) -> Result<(), Error> {
        if self.family_member_id.trim().is_empty() || self.drug_id.trim().is_empty() {
            return Err(Error::invalid_input("Family member and drug are required"));
        }
        if self.cost.is_some_and(|cost| !cost.is_finite() || cost < 0.0) {
            return Err(Error::invalid_input("Cost must be a non-negative number"));
        }
        Ok(())
    }

    pub fn into_medication(self, id: String) -> Result<FamilyMedication, Error> {
        self.validate()?;

        Ok(FamilyMedication {
            id,
            family_member_id: self.family_member_id.trim().to_string(),
            drug_id: self.drug_id.trim().to_string(),
            dosage: self.dosage,
            frequency: self.frequency,
            notes: self.notes,
            cost: self.cost,
        })
    }
}

/// A medication together with the catalogue entry it refers to.
///
/// `drug` is `None` when the catalogue no longer holds the drug, e.g. after a reseed.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MedicationView {
    #[serde(flatten)]
    pub medication: FamilyMedication,
    pub drug: Option<DrugRecord>,
}

pub fn attach_drugs(medications: Vec<FamilyMedication>, drugs: &[DrugRecord]) -> Vec<MedicationView> {
    medications
        .into_iter()
        .map(|medication| {
            let drug = drugs.iter().find(|d| d.id == medication.drug_id).cloned();
            MedicationView { medication, drug }
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyMedication {
    pub drug_name: Option<String>,
    pub dosage: String,
    pub frequency: String,
}

/// What a first responder needs to know about a member
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyInfo {
    pub name: String,
    pub age: Option<u32>,
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub medications: Vec<EmergencyMedication>,
}

impl EmergencyInfo {
    pub fn from_member(member: FamilyMember, medications: Vec<MedicationView>) -> Self {
        let medications = medications
            .into_iter()
            .map(|view| EmergencyMedication {
                drug_name: view.drug.map(|drug| drug.name),
                dosage: view.medication.dosage,
                frequency: view.medication.frequency,
            })
            .collect();

        Self {
            name: member.name,
            age: member.age,
            allergies: member.allergies,
            conditions: member.conditions,
            emergency_contact: member.emergency_contact,
            emergency_phone: member.emergency_phone,
            medications,
        }
    }
}
