/// Family members, medications and emergency summaries
pub mod record;

/// Family store contract and in-memory store
pub mod store;

/// DynamoDB-backed family store
pub mod dynamo;

pub use record::{
    attach_drugs, EmergencyInfo, FamilyMedication, FamilyMember, FamilyRole, MedicationView,
    NewFamilyMember, NewMedication,
};
pub use store::{FamilyStore, MemoryFamilyStore};
