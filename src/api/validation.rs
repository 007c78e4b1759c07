use super::ApiError;
use crate::archive::is_safe_identifier;
use crate::constants::search::MIN_QUERY_LEN;

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_LEN {
        return Err(ApiError::validation(format!(
            "Search query must be at least {} characters",
            MIN_QUERY_LEN
        )));
    }
    Ok(trimmed)
}

pub fn validate_year(year: &str) -> Result<&str, ApiError> {
    if year.is_empty() {
        return Err(ApiError::validation("Year is required"));
    }
    if !is_safe_identifier(year) {
        return Err(ApiError::validation(
            "Year may only contain letters, digits and underscores",
        ));
    }
    Ok(year)
}

/// An empty prefix is valid and means "no prefix".
pub fn validate_prefix(prefix: &str) -> Result<&str, ApiError> {
    if !prefix.is_empty() && !is_safe_identifier(prefix) {
        return Err(ApiError::validation(
            "Prefix may only contain letters, digits and underscores",
        ));
    }
    Ok(prefix)
}

pub fn validate_table_name(name: &str) -> Result<&str, ApiError> {
    if name.is_empty() {
        return Err(ApiError::validation("Table names cannot be empty"));
    }
    if !is_safe_identifier(name) {
        return Err(ApiError::validation(format!(
            "Invalid table name '{}': only letters, digits and underscores are allowed",
            name
        )));
    }
    Ok(name)
}
