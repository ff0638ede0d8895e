/// Drug record and category
pub mod record;

/// List column encoding
pub mod codec;

/// Query filter
pub mod filter;

/// Natural-language query interpreter
pub mod interpreter;

/// Faceted search resolver
pub mod resolver;

/// Record store contract and in-memory store
pub mod store;

/// DynamoDB-backed store
pub mod dynamo;

/// Per-category statistics
pub mod stats;

/// Catalogue seeding
pub mod seed;

/// Input DTOs
pub mod inputs;

pub use filter::{Direction, OrderBy, QueryFilter, SortField};
pub use interpreter::{interpret, Interpretation};
pub use record::{Category, DrugRecord, NewDrug};
pub use resolver::{build_filter, ALL_CATEGORIES};
pub use store::{MemoryStore, RecordStore};
