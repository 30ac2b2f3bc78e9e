//! Generic search repository over a composable select builder
//!
//! The repository layer separates three concerns: [`SelectQuery`] builds
//! SQL, [`SearchProfile`] describes how one resource type is searched,
//! and the [`QueryStore`]/[`EntityStore`] seams execute against the
//! persistence engine. [`SearchRepository`] ties them together for list
//! and lookup requests.

mod profile;
mod query;
mod search;
mod store;

#[cfg(feature = "database")]
mod pg;

pub use profile::{SearchParams, SearchProfile};
pub use query::{BindValue, Relation, SelectQuery};
pub use search::{SearchRepository, SearchResult};
pub use store::{
    EntityStore, QueryStore, RepositoryError, RepositoryErrorKind, RepositoryOperation,
};

#[cfg(feature = "database")]
pub use pg::PgStore;
