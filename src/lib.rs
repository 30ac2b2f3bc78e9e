//! Reusable CRUD REST plumbing for axum services.
//!
//! restkit carries the request-handling machinery every CRUD API repeats:
//!
//! - **Problem responses**: a request-failure taxonomy ([`problem::ApiError`])
//!   rendered as `application/problem+json` bodies of stable,
//!   machine-readable error codes, with raw framework messages normalized
//!   by pattern and internal failures redacted outside dev/test.
//! - **Criteria validation**: pagination and sort parameters validated at
//!   the boundary ([`criteria`]), rejecting the request instead of
//!   guessing.
//! - **Generic search**: a select builder plus per-resource search
//!   profiles ([`repository`]) answering list requests with a page of
//!   items and the total match count.
//! - **Write orchestration**: payload binding, lifecycle hooks, and the
//!   create/update/delete flow ([`resource`]).
//! - **Routing**: the conventional CRUD surface for any resource
//!   ([`routing`]), with problem-rendering 404/405 fallbacks.
//!
//! # Example
//!
//! ```rust,no_run
//! use restkit::config::Config;
//! use restkit::observability;
//!
//! # fn main() -> restkit::error::Result<()> {
//! let config = Config::load()?;
//! observability::init_tracing(&config);
//! config.install();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod criteria;
pub mod error;
pub mod ids;
pub mod observability;
pub mod problem;
pub mod repository;
pub mod resource;
pub mod routing;

pub mod prelude {
    //! The types most services need.
    pub use crate::config::Config;
    pub use crate::criteria::{PageWindow, SortDirection};
    pub use crate::ids::FunctionalId;
    pub use crate::problem::{codes, ApiError, ApiProblem, ProblemOptions};
    pub use crate::repository::{
        BindValue, EntityStore, QueryStore, Relation, SearchParams, SearchProfile,
        SearchRepository, SearchResult, SelectQuery,
    };
    pub use crate::resource::{FormBinder, FormErrors, LifecycleHooks, ResourceWriter};
    pub use crate::routing::{resource_routes, with_problem_fallbacks, RestResource};
}
