pub mod actions;
pub mod chats;
pub mod contacts;
pub mod messages;

use crate::error::ApiError;

/// A non-positive limit or negative page would turn into an unbounded or
/// nonsensical SQL LIMIT clause, so both are rejected at the boundary.
pub fn validate_pagination(limit: i64, page: i64) -> Result<(), ApiError> {
    if limit <= 0 {
        return Err(ApiError::Validation("limit must be positive".to_string()));
    }
    if page < 0 {
        return Err(ApiError::Validation("page must not be negative".to_string()));
    }
    Ok(())
}
