use std::{env, sync::Arc};

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, Client};
use serde::de::DeserializeOwned;
use ulid::Ulid;

use crate::{
    drugs::dynamo::{delete_items, key_for, scan, Item, ScanSpec},
    errors::Error,
};

use super::{
    record::{FamilyMedication, FamilyMember, NewFamilyMember, NewMedication},
    store::{FamilyStore, MEDICATION, MEMBER},
};

const ID_ATTRIBUTE: &str = "id";
const MEMBER_ATTRIBUTE: &str = "familyMemberId";

fn decode_all<T: DeserializeOwned>(items: Vec<Item>) -> Result<Vec<T>, Error> {
    items
        .into_iter()
        .map(|item| serde_dynamo::from_item(item).map_err(Error::persistence))
        .collect()
}

/// Members and medications in two tables, both keyed by `id`
pub struct DynamoFamilyStore {
    client: Client,
    members_table: String,
    medications_table: String,
}

impl DynamoFamilyStore {
    pub fn new(
        client: Client,
        members_table: impl Into<String>,
        medications_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            members_table: members_table.into(),
            medications_table: medications_table.into(),
        }
    }

    async fn put_medication(
        &self,
        medication: &FamilyMedication,
        condition: &str,
    ) -> Result<(), Error> {
        let item: Item = serde_dynamo::to_item(medication).map_err(Error::persistence)?;

        self.client
            .put_item()
            .table_name(&self.medications_table)
            .set_item(Some(item))
            .condition_expression(condition)
            .expression_attribute_names("#id", ID_ATTRIBUTE)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception())
                {
                    Error::not_found(MEDICATION, medication.id.clone())
                } else {
                    Error::persistence(DisplayErrorContext(e))
                }
            })?;

        Ok(())
    }

    async fn delete_existing(&self, table: &str, entity: &str, id: &str) -> Result<(), Error> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key_for(ID_ATTRIBUTE, id)))
            .condition_expression("attribute_exists(#id)")
            .expression_attribute_names("#id", ID_ATTRIBUTE)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception())
                {
                    Error::not_found(entity, id)
                } else {
                    Error::persistence(DisplayErrorContext(e))
                }
            })?;

        Ok(())
    }
}

#[async_trait]
impl FamilyStore for DynamoFamilyStore {
    async fn members(&self) -> Result<Vec<FamilyMember>, Error> {
        decode_all(scan(&self.client, &self.members_table, &ScanSpec::all()).await?)
    }

    async fn member(&self, id: &str) -> Result<FamilyMember, Error> {
        let output = self
            .client
            .get_item()
            .table_name(&self.members_table)
            .set_key(Some(key_for(ID_ATTRIBUTE, id)))
            .send()
            .await
            .map_err(|e| Error::persistence(DisplayErrorContext(e)))?;

        let item = output
            .item()
            .cloned()
            .ok_or_else(|| Error::not_found(MEMBER, id))?;

        serde_dynamo::from_item(item).map_err(Error::persistence)
    }

    async fn add_member(&self, member: NewFamilyMember) -> Result<FamilyMember, Error> {
        let member = member.into_member(Ulid::new().to_string())?;
        let item: Item = serde_dynamo::to_item(&member).map_err(Error::persistence)?;

        self.client
            .put_item()
            .table_name(&self.members_table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::persistence(DisplayErrorContext(e)))?;

        Ok(member)
    }

    async fn remove_member(&self, id: &str) -> Result<(), Error> {
        self.delete_existing(&self.members_table, MEMBER, id).await?;

        let medications = scan(
            &self.client,
            &self.medications_table,
            &ScanSpec::matching(MEMBER_ATTRIBUTE, id),
        )
        .await?;
        delete_items(&self.client, &self.medications_table, ID_ATTRIBUTE, &medications).await?;

        tracing::info!(
            "Removed family member {} and {} medications",
            id,
            medications.len()
        );
        Ok(())
    }

    async fn medications(&self) -> Result<Vec<FamilyMedication>, Error> {
        decode_all(scan(&self.client, &self.medications_table, &ScanSpec::all()).await?)
    }

    async fn medications_for(&self, member_id: &str) -> Result<Vec<FamilyMedication>, Error> {
        self.member(member_id).await?;

        decode_all(
            scan(
                &self.client,
                &self.medications_table,
                &ScanSpec::matching(MEMBER_ATTRIBUTE, member_id),
            )
            .await?,
        )
    }

    async fn add_medication(&self, medication: NewMedication) -> Result<FamilyMedication, Error> {
        let medication = medication.into_medication(Ulid::new().to_string())?;
        self.member(&medication.family_member_id).await?;

        self.put_medication(&medication, "attribute_not_exists(#id)")
            .await?;
        Ok(medication)
    }

    async fn update_medication(
        &self,
        id: &str,
        medication: NewMedication,
    ) -> Result<FamilyMedication, Error> {
        let medication = medication.into_medication(id.to_string())?;
        self.member(&medication.family_member_id).await?;

        self.put_medication(&medication, "attribute_exists(#id)")
            .await?;
        Ok(medication)
    }

    async fn remove_medication(&self, id: &str) -> Result<(), Error> {
        self.delete_existing(&self.medications_table, MEDICATION, id)
            .await
    }
}

pub fn init_family_store(client: Client) -> Arc<dyn FamilyStore> {
    let members_table =
        env::var("DYNAMODB_FAMILY_TABLE").unwrap_or("drugreco-family-members".to_string());
    let medications_table = env::var("DYNAMODB_MEDICATIONS_TABLE")
        .unwrap_or("drugreco-family-medications".to_string());

    Arc::new(DynamoFamilyStore::new(client, members_table, medications_table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::AttributeValue;

    #[test]
    fn member_item_keeps_native_lists() {
        let member = NewFamilyMember {
            name: "Asha".to_string(),
            age: Some(34),
            allergies: vec!["Penicillin".to_string()],
            ..Default::default()
        }
        .into_member("01J0".to_string())
        .unwrap();

        let item: Item = serde_dynamo::to_item(&member).unwrap();

        assert_eq!(item["id"], AttributeValue::S("01J0".to_string()));
        assert_eq!(
            item["allergies"],
            AttributeValue::L(vec![AttributeValue::S("Penicillin".to_string())])
        );
        assert_eq!(item["role"], AttributeValue::S("member".to_string()));

        let decoded: Vec<FamilyMember> = decode_all(vec![item]).unwrap();
        assert_eq!(decoded, [member]);
    }

    #[test]
    fn medication_item_is_scannable_by_member() {
        let medication = NewMedication {
            family_member_id: "m1".to_string(),
            drug_id: "drug-1".to_string(),
            cost: Some(50.0),
            ..Default::default()
        }
        .into_medication("med-1".to_string())
        .unwrap();

        let item: Item = serde_dynamo::to_item(&medication).unwrap();

        assert_eq!(item[MEMBER_ATTRIBUTE], AttributeValue::S("m1".to_string()));

        let decoded: Vec<FamilyMedication> = decode_all(vec![item]).unwrap();
        assert_eq!(decoded[0], medication);
    }
}
