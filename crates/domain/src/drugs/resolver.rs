use crate::errors::Error;

use super::{filter::QueryFilter, record::Category};

/// Category value meaning "no category constraint"
pub const ALL_CATEGORIES: &str = "all";

pub const MAX_QUERY_LEN: usize = 100;

/// Strips everything outside word chars, whitespace and `-`, trims, truncates.
pub fn sanitize_query(query: &str) -> String {
    let kept: String = query
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    kept.trim().chars().take(MAX_QUERY_LEN).collect()
}

/// Rejects a query that sanitisation would alter
pub fn validate_query(query: &str) -> Result<&str, Error> {
    if sanitize_query(query) != query {
        return Err(Error::invalid_input("Invalid characters in search query"));
    }
    Ok(query)
}

pub fn parse_category(category: &str) -> Result<Option<Category>, Error> {
    if category == ALL_CATEGORIES {
        return Ok(None);
    }
    category.parse().map(Some)
}

/// Builds the filter for the faceted search path
pub fn build_filter(query: Option<&str>, category: Option<&str>) -> Result<QueryFilter, Error> {
    let mut filter = QueryFilter::default();

    if let Some(category) = category.filter(|c| !c.is_empty()) {
        filter.category = parse_category(category)?;
    }

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        filter.name_patterns.push(validate_query(query)?.to_string());
    }

    Ok(filter)
}
