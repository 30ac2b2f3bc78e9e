//! Request criteria validation
//!
//! Pagination and sort parameters are validated at the request boundary.
//! A query either runs with fully validated criteria or is rejected with
//! a 400 problem; criteria are never partially applied.

mod pagination;
mod sort;

pub use pagination::{
    install_default_per_page, validate_pagination, validate_pagination_with, PageWindow,
    DEFAULT_PER_PAGE,
};
pub use sort::{validate_sort, SortDirection};
