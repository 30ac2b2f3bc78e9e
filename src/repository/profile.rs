//! Per-resource search configuration
//!
//! A [`SearchProfile`] describes how one resource type is searched: the
//! table and root alias, the sortable fields and their internal paths,
//! the joinable relations, and how raw request filters become predicates.

use std::collections::HashMap;

use crate::criteria::SortDirection;

use super::query::{Relation, SelectQuery};

/// Raw search parameters from the request query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
    /// Everything else, kept for the profile's filter hook.
    pub filters: HashMap<String, String>,
}

impl SearchParams {
    /// Split a decoded query-string map into the reserved pagination/sort
    /// parameters and resource-specific filters.
    #[must_use]
    pub fn from_query(mut query: HashMap<String, String>) -> Self {
        Self {
            page: query.remove("page"),
            limit: query.remove("limit"),
            sort: query.remove("sort"),
            filters: query,
        }
    }

    /// A resource-specific filter value.
    #[must_use]
    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }
}

/// How one resource type is searched.
pub trait SearchProfile: Send + Sync {
    /// Table the resource lives in.
    fn table(&self) -> &'static str;

    /// Root alias used in rendered SQL.
    fn alias(&self) -> &'static str {
        "e"
    }

    /// Error-code slug for this resource (`user` -> `user.not_found`).
    fn slug(&self) -> &'static str;

    /// Column counted for totals.
    fn count_column(&self) -> &'static str {
        "id"
    }

    /// Sortable fields: public name to internal column path. Paths may
    /// traverse registered relations (`owner.name`).
    fn available_sorts(&self) -> &'static [(&'static str, &'static str)];

    /// Ordering applied when the request does not sort.
    fn default_sorts(&self) -> &'static [(&'static str, SortDirection)] {
        &[]
    }

    /// Relations reachable from sort paths.
    fn relations(&self) -> &'static [Relation] {
        &[]
    }

    /// Translate resource-specific filters into predicates. Reserved
    /// parameters (page/limit/sort) are already stripped from `params`.
    fn apply_filters(&self, query: &mut SelectQuery, params: &SearchParams);
}
