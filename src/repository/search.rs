//! Generic search repository
//!
//! [`SearchRepository`] combines a [`SearchProfile`] with a
//! [`QueryStore`] to answer list requests: it validates pagination and
//! sort criteria, applies the profile's filters, and executes both the
//! page query and the matching count.
//!
//! # Example
//!
//! ```rust,ignore
//! let repo: SearchRepository<User, _, _> = SearchRepository::new(profile, store);
//! let result = repo.search(&params).await?;
//! assert!(result.items.len() as u64 <= result.total);
//! ```

use std::marker::PhantomData;

use crate::criteria::{validate_pagination, validate_sort, SortDirection};
use crate::problem::ApiError;

use super::profile::{SearchParams, SearchProfile};
use super::query::{BindValue, SelectQuery};
use super::store::QueryStore;

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<E> {
    /// The page of entities, at most `limit` long.
    pub items: Vec<E>,
    /// Total matches ignoring the window.
    pub total: u64,
}

/// Search and lookup over one resource type.
#[derive(Debug, Clone)]
pub struct SearchRepository<E, P, S> {
    profile: P,
    store: S,
    _entity: PhantomData<fn() -> E>,
}

impl<E, P: SearchProfile, S> SearchRepository<E, P, S> {
    pub fn new(profile: P, store: S) -> Self {
        Self {
            profile,
            store,
            _entity: PhantomData,
        }
    }

    /// The profile this repository searches with.
    pub fn profile(&self) -> &P {
        &self.profile
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build the filtered base query shared by search and count.
    fn base_query(&self, params: &SearchParams) -> SelectQuery {
        let mut query = SelectQuery::new(self.profile.table(), self.profile.alias()).distinct();
        self.profile.apply_filters(&mut query, params);
        query
    }
}

impl<E, P, S> SearchRepository<E, P, S>
where
    P: SearchProfile,
    S: QueryStore<E>,
    E: Send,
{
    /// Run a validated search: filters, window, sorts, then fetch the
    /// page and the total in two statements over the same predicates.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResult<E>, ApiError> {
        let window = validate_pagination(params.page.as_deref(), params.limit.as_deref())?;
        let sorts = validate_sort(self.profile.available_sorts(), params.sort.as_deref())?;

        let mut query = self.base_query(params);
        query.window(window);
        query.apply_sorts(sorts, self.profile.default_sorts(), self.profile.relations())?;

        tracing::debug!(sql = %query.to_sql(), "executing search");
        let total = self
            .store
            .fetch_count(&query, self.profile.count_column())
            .await?;
        let items = self.store.fetch(&query).await?;

        Ok(SearchResult { items, total })
    }

    /// Count matches for the same filters, without window or sorts.
    pub async fn count(&self, params: &SearchParams) -> Result<u64, ApiError> {
        let query = self.base_query(params);
        tracing::debug!(sql = %query.to_count_sql(self.profile.count_column()), "executing count");
        Ok(self
            .store
            .fetch_count(&query, self.profile.count_column())
            .await?)
    }

    /// Fetch entities matching exact column criteria, with optional
    /// ordering and window. Criteria columns are relative to the root
    /// alias. Limit and offset apply independently; either may be 0 to
    /// leave that side unbounded.
    pub async fn find_by(
        &self,
        criteria: &[(&str, BindValue)],
        order_by: &[(&str, SortDirection)],
        limit: u64,
        offset: u64,
    ) -> Result<Vec<E>, ApiError> {
        let mut query = SelectQuery::new(self.profile.table(), self.profile.alias());
        for (column, value) in criteria {
            query.and_where_eq(format!("{}.{column}", self.profile.alias()), value.clone());
        }
        for (column, direction) in order_by {
            query.add_order_by(format!("{}.{column}", self.profile.alias()), *direction);
        }
        if limit > 0 {
            query.limit(limit);
        }
        if offset > 0 {
            query.offset(offset);
        }

        tracing::debug!(sql = %query.to_sql(), "executing find_by");
        Ok(self.store.fetch(&query).await?)
    }

    /// Fetch zero or one entity matching exact column criteria.
    pub async fn find_one_by(
        &self,
        criteria: &[(&str, BindValue)],
        order_by: &[(&str, SortDirection)],
    ) -> Result<Option<E>, ApiError> {
        let mut items = self.find_by(criteria, order_by, 1, 0).await?;
        Ok(if items.is_empty() {
            None
        } else {
            Some(items.swap_remove(0))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::repository::store::{RepositoryError, RepositoryOperation};
    use crate::repository::Relation;

    struct Users;

    impl SearchProfile for Users {
        fn table(&self) -> &'static str {
            "users"
        }

        fn slug(&self) -> &'static str {
            "user"
        }

        fn available_sorts(&self) -> &'static [(&'static str, &'static str)] {
            &[("name", "name"), ("team", "team.name")]
        }

        fn default_sorts(&self) -> &'static [(&'static str, SortDirection)] {
            &[("name", SortDirection::Asc)]
        }

        fn relations(&self) -> &'static [Relation] {
            &[Relation {
                name: "team",
                table: "teams",
                parent_key: "team_id",
                child_key: "id",
            }]
        }

        fn apply_filters(&self, query: &mut SelectQuery, params: &SearchParams) {
            if let Some(status) = params.filter("status") {
                query.and_where_eq("e.status", status);
            }
        }
    }

    /// Records rendered SQL and returns canned results.
    #[derive(Default)]
    struct RecordingStore {
        statements: Mutex<Vec<String>>,
    }

    impl QueryStore<String> for RecordingStore {
        async fn fetch(&self, query: &SelectQuery) -> Result<Vec<String>, RepositoryError> {
            self.statements.lock().unwrap().push(query.to_sql());
            Ok(vec!["row".to_string()])
        }

        async fn fetch_count(
            &self,
            query: &SelectQuery,
            count_column: &str,
        ) -> Result<u64, RepositoryError> {
            self.statements
                .lock()
                .unwrap()
                .push(query.to_count_sql(count_column));
            Ok(1)
        }
    }

    fn params(entries: &[(&str, &str)]) -> SearchParams {
        let map: HashMap<String, String> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        SearchParams::from_query(map)
    }

    #[tokio::test]
    async fn test_repository_type_is_nameable_per_entity() {
        let repo: SearchRepository<String, Users, RecordingStore> =
            SearchRepository::new(Users, RecordingStore::default());
        let result = repo.search(&params(&[])).await.unwrap();
        assert_eq!(result.items, vec!["row".to_string()]);
        assert_eq!(result.total, 1);
    }

    #[tokio::test]
    async fn test_search_builds_windowed_sorted_query() {
        let repo = SearchRepository::new(Users, RecordingStore::default());
        let result = repo
            .search(&params(&[
                ("page", "2"),
                ("limit", "10"),
                ("sort", "team:desc"),
                ("status", "active"),
            ]))
            .await
            .unwrap();

        assert_eq!(result.total, 1);
        let statements = repo.store().statements.lock().unwrap().clone();
        assert_eq!(
            statements[0],
            "SELECT COUNT(DISTINCT e.id) FROM users AS e \
             LEFT JOIN teams AS team ON e.team_id = team.id \
             WHERE e.status = $1"
        );
        assert_eq!(
            statements[1],
            "SELECT DISTINCT e.* FROM users AS e \
             LEFT JOIN teams AS team ON e.team_id = team.id \
             WHERE e.status = $1 \
             ORDER BY team.name DESC LIMIT 10 OFFSET 10"
        );
    }

    #[tokio::test]
    async fn test_search_uses_default_sorts() {
        let repo = SearchRepository::new(Users, RecordingStore::default());
        repo.search(&params(&[])).await.unwrap();
        let statements = repo.store().statements.lock().unwrap().clone();
        assert!(statements[1].ends_with("ORDER BY e.name ASC"));
    }

    #[tokio::test]
    async fn test_search_rejects_bad_page() {
        let repo = SearchRepository::new(Users, RecordingStore::default());
        let err = repo.search(&params(&[("page", "zero")])).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::bad_request(crate::problem::codes::PAGINATION_INCORRECT_PAGE_VALUE)
        );
        assert!(repo.store().statements.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_unknown_sort_field() {
        let repo = SearchRepository::new(Users, RecordingStore::default());
        let err = repo
            .search(&params(&[("sort", "age:asc")]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::bad_request(crate::problem::codes::RESULT_ORDER_INCORRECT)
        );
    }

    #[tokio::test]
    async fn test_find_by_renders_criteria() {
        let repo = SearchRepository::new(Users, RecordingStore::default());
        repo.find_by(
            &[("status", BindValue::from("active"))],
            &[("name", SortDirection::Desc)],
            5,
            0,
        )
        .await
        .unwrap();
        let statements = repo.store().statements.lock().unwrap().clone();
        assert_eq!(
            statements[0],
            "SELECT e.* FROM users AS e WHERE e.status = $1 \
             ORDER BY e.name DESC LIMIT 5"
        );
    }

    #[tokio::test]
    async fn test_find_by_applies_offset_without_limit() {
        let repo = SearchRepository::new(Users, RecordingStore::default());
        repo.find_by(&[], &[("name", SortDirection::Asc)], 0, 10)
            .await
            .unwrap();
        let statements = repo.store().statements.lock().unwrap().clone();
        assert_eq!(
            statements[0],
            "SELECT e.* FROM users AS e ORDER BY e.name ASC OFFSET 10"
        );
    }

    #[tokio::test]
    async fn test_find_one_by_returns_first() {
        let repo = SearchRepository::new(Users, RecordingStore::default());
        let found = repo
            .find_one_by(&[("uuid", BindValue::from("x"))], &[])
            .await
            .unwrap();
        assert_eq!(found, Some("row".to_string()));
    }

    #[tokio::test]
    async fn test_store_errors_become_api_errors() {
        struct FailingStore;

        impl QueryStore<String> for FailingStore {
            async fn fetch(&self, _: &SelectQuery) -> Result<Vec<String>, RepositoryError> {
                Err(RepositoryError::database(
                    RepositoryOperation::Search,
                    "connection reset",
                ))
            }

            async fn fetch_count(
                &self,
                _: &SelectQuery,
                _: &str,
            ) -> Result<u64, RepositoryError> {
                Err(RepositoryError::database(
                    RepositoryOperation::Count,
                    "connection reset",
                ))
            }
        }

        let repo = SearchRepository::new(Users, FailingStore);
        let err = repo.search(&params(&[])).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal { .. }));
    }
}
