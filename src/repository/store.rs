//! Storage seams and repository errors
//!
//! [`QueryStore`] and [`EntityStore`] are the boundary to the persistence
//! engine: the repository builds queries and orchestrates writes, the
//! store executes them. Implementations live behind the `database` feature
//! or in test code.

use std::future::Future;

use crate::problem::ApiError;

use super::query::SelectQuery;

/// Which repository operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOperation {
    Search,
    Count,
    FindBy,
    Insert,
    Update,
    Remove,
}

impl std::fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Search => "search",
            Self::Count => "count",
            Self::FindBy => "find_by",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Remove => "remove",
        };
        write!(f, "{name}")
    }
}

/// What kind of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryErrorKind {
    /// The requested entity does not exist.
    NotFound,
    /// A storage constraint rejected the operation.
    ConstraintViolation,
    /// The storage backend could not be reached.
    ConnectionFailed,
    /// The backend reported an error executing the statement.
    DatabaseError,
    /// Anything else, including bad query construction.
    Other,
}

/// A failure crossing the storage seam, tagged with the operation and
/// failure kind and optionally the resource slug it concerns.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
#[error("{operation} failed ({kind:?}): {message}")]
pub struct RepositoryError {
    pub operation: RepositoryOperation,
    pub kind: RepositoryErrorKind,
    pub message: String,
    pub entity_slug: Option<String>,
}

impl RepositoryError {
    #[must_use]
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_slug: None,
        }
    }

    /// Attach the resource slug the failure concerns.
    #[must_use]
    pub fn for_entity(mut self, slug: impl Into<String>) -> Self {
        self.entity_slug = Some(slug.into());
        self
    }

    /// The entity was not found.
    pub fn not_found(operation: RepositoryOperation, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self::new(operation, RepositoryErrorKind::NotFound, format!("{slug} not found"))
            .for_entity(slug)
    }

    /// The backend rejected the statement.
    pub fn database(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// A sort path referenced a relation the profile does not register.
    pub fn unknown_relation(segment: &str, path: &str) -> Self {
        Self::new(
            RepositoryOperation::Search,
            RepositoryErrorKind::Other,
            format!("unknown relation '{segment}' in sort path '{path}'"),
        )
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match (err.kind, err.entity_slug.as_deref()) {
            (RepositoryErrorKind::NotFound, Some(slug)) => ApiError::not_found(slug),
            _ => ApiError::internal(&err),
        }
    }
}

/// Read side of the storage seam: executes a [`SelectQuery`].
pub trait QueryStore<E>: Send + Sync {
    /// Fetch all rows the query selects.
    fn fetch(
        &self,
        query: &SelectQuery,
    ) -> impl Future<Output = Result<Vec<E>, RepositoryError>> + Send;

    /// Count distinct root rows over `count_column`.
    fn fetch_count(
        &self,
        query: &SelectQuery,
        count_column: &str,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}

/// Write side of the storage seam.
pub trait EntityStore<E>: Send + Sync {
    /// Persist a new entity, filling generated identifiers in place.
    fn insert(&self, entity: &mut E) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Persist changes to an existing entity.
    fn update(&self, entity: &E) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete an entity. Constraint rejections surface as
    /// [`RepositoryErrorKind::ConstraintViolation`].
    fn remove(&self, entity: &E) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_converts_to_api_not_found() {
        let err = RepositoryError::not_found(RepositoryOperation::FindBy, "user");
        let api: ApiError = err.into();
        assert_eq!(api, ApiError::not_found("user"));
    }

    #[test]
    fn test_database_error_converts_to_internal() {
        let err = RepositoryError::database(RepositoryOperation::Search, "syntax error");
        let api: ApiError = err.into();
        match api {
            ApiError::Internal { message, .. } => {
                assert!(message.contains("syntax error"));
            }
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn test_display_includes_operation_and_kind() {
        let err = RepositoryError::database(RepositoryOperation::Insert, "duplicate key");
        let text = err.to_string();
        assert!(text.contains("insert"));
        assert!(text.contains("duplicate key"));
    }
}
