use async_trait::async_trait;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::errors::Error;

use super::record::{FamilyMedication, FamilyMember, NewFamilyMember, NewMedication};

pub(crate) const MEMBER: &str = "Family member";
pub(crate) const MEDICATION: &str = "Medication";

/// Persistence collaborator for family members and their medications.
///
/// Lookups by id fail with [`Error::NotFound`] where the caller named
/// something that does not exist.
#[async_trait]
pub trait FamilyStore: Send + Sync {
    async fn members(&self) -> Result<Vec<FamilyMember>, Error>;

    async fn member(&self, id: &str) -> Result<FamilyMember, Error>;

    async fn add_member(&self, member: NewFamilyMember) -> Result<FamilyMember, Error>;

    /// Removes the member along with every medication recorded for them
    async fn remove_member(&self, id: &str) -> Result<(), Error>;

    async fn medications(&self) -> Result<Vec<FamilyMedication>, Error>;

    async fn medications_for(&self, member_id: &str) -> Result<Vec<FamilyMedication>, Error>;

    async fn add_medication(&self, medication: NewMedication) -> Result<FamilyMedication, Error>;

    async fn update_medication(
        &self,
        id: &str,
        medication: NewMedication,
    ) -> Result<FamilyMedication, Error>;

    async fn remove_medication(&self, id: &str) -> Result<(), Error>;
}

#[derive(Default)]
struct Household {
    members: Vec<FamilyMember>,
    medications: Vec<FamilyMedication>,
}

impl Household {
    fn require_member(&self, id: &str) -> Result<&FamilyMember, Error> {
        self.members
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::not_found(MEMBER, id))
    }
}

/// Family store held in process memory
#[derive(Default)]
pub struct MemoryFamilyStore {
    household: RwLock<Household>,
}

impl MemoryFamilyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FamilyStore for MemoryFamilyStore {
    async fn members(&self) -> Result<Vec<FamilyMember>, Error> {
        Ok(self.household.read().await.members.clone())
    }

    async fn member(&self, id: &str) -> Result<FamilyMember, Error> {
        self.household.read().await.require_member(id).cloned()
    }

    async fn add_member(&self, member: NewFamilyMember) -> Result<FamilyMember, Error> {
        let member = member.into_member(Ulid::new().to_string())?;
        self.household.write().await.members.push(member.clone());
        Ok(member)
    }

    async fn remove_member(&self, id: &str) -> Result<(), Error> {
        let mut household = self.household.write().await;
        household.require_member(id)?;

        household.members.retain(|m| m.id != id);
        household.medications.retain(|m| m.family_member_id != id);
        Ok(())
    }

    async fn medications(&self) -> Result<Vec<FamilyMedication>, Error> {
        Ok(self.household.read().await.medications.clone())
    }

    async fn medications_for(&self, member_id: &str) -> Result<Vec<FamilyMedication>, Error> {
        let household = self.household.read().await;
        household.require_member(member_id)?;

        Ok(household
            .medications
            .iter()
            .filter(|m| m.family_member_id == member_id)
            .cloned()
            .collect())
    }

    async fn add_medication(&self, medication: NewMedication) -> Result<FamilyMedication, Error> {
        let medication = medication.into_medication(Ulid::new().to_string())?;

        let mut household = self.household.write().await;
        household.require_member(&medication.family_member_id)?;
        household.medications.push(medication.clone());

        Ok(medication)
    }

    async fn update_medication(
        &self,
        id: &str,
        medication: NewMedication,
    ) -> Result<FamilyMedication, Error> {
        let medication = medication.into_medication(id.to_string())?;

        let mut household = self.household.write().await;
        household.require_member(&medication.family_member_id)?;
        let slot = household
            .medications
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| Error::not_found(MEDICATION, id))?;
        *slot = medication.clone();

        Ok(medication)
    }

    async fn remove_medication(&self, id: &str) -> Result<(), Error> {
        let mut household = self.household.write().await;
        let before = household.medications.len();
        household.medications.retain(|m| m.id != id);

        if household.medications.len() == before {
            return Err(Error::not_found(MEDICATION, id));
        }
        Ok(())
    }
}
