//! Drug catalogue domain: records, query interpretation, family medications and their stores

/// Drug records, filters and stores
pub mod drugs;

/// Domain errors
pub mod errors;

/// Family members and the medications they take
pub mod family;

/// Interaction check placeholder
pub mod interactions;

pub use errors::Error;
