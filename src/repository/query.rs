//! Composable SQL select builder
//!
//! [`SelectQuery`] accumulates predicates, joins, ordering and a window,
//! then renders SQL text with positional (`$n`) parameters. It covers the
//! shapes the search repository needs; it is not a general query engine.
//!
//! # Example
//!
//! ```rust
//! use restkit::repository::SelectQuery;
//!
//! let mut query = SelectQuery::new("users", "e").distinct();
//! query.and_where_eq("e.status", "active");
//! assert_eq!(
//!     query.to_sql(),
//!     "SELECT DISTINCT e.* FROM users AS e WHERE e.status = $1"
//! );
//! ```

use crate::criteria::{PageWindow, SortDirection};

use super::store::RepositoryError;

/// A value bound to a positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Uuid(uuid::Uuid),
    Null,
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<uuid::Uuid> for BindValue {
    fn from(v: uuid::Uuid) -> Self {
        Self::Uuid(v)
    }
}

/// A joinable relation registered on a search profile.
///
/// `name` is the segment used in sort paths; the join renders as
/// `LEFT JOIN table AS name ON parent.parent_key = name.child_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    pub table: &'static str,
    pub parent_key: &'static str,
    pub child_key: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Join {
    table: String,
    alias: String,
    on: String,
}

/// A select statement under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    alias: String,
    distinct: bool,
    predicates: Vec<String>,
    binds: Vec<BindValue>,
    joins: Vec<Join>,
    orders: Vec<(String, SortDirection)>,
    limit: u64,
    offset: u64,
}

impl SelectQuery {
    /// Start a select over `table` rooted at `alias`.
    #[must_use]
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: alias.into(),
            distinct: false,
            predicates: Vec::new(),
            binds: Vec::new(),
            joins: Vec::new(),
            orders: Vec::new(),
            limit: 0,
            offset: 0,
        }
    }

    /// Root alias of the query.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Select distinct root rows. Required once joins multiply rows.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add an equality predicate with a bound value.
    pub fn and_where_eq(&mut self, lhs: impl Into<String>, value: impl Into<BindValue>) {
        self.binds.push(value.into());
        let n = self.binds.len();
        self.predicates.push(format!("{} = ${n}", lhs.into()));
    }

    /// Add a raw predicate fragment; each `?` placeholder is rewritten to
    /// the next positional parameter.
    pub fn and_where(&mut self, fragment: &str, values: Vec<BindValue>) {
        debug_assert_eq!(fragment.matches('?').count(), values.len());
        let mut rendered = String::with_capacity(fragment.len());
        let mut parts = fragment.split('?');
        if let Some(first) = parts.next() {
            rendered.push_str(first);
        }
        for (value, rest) in values.into_iter().zip(parts) {
            self.binds.push(value);
            rendered.push_str(&format!("${}", self.binds.len()));
            rendered.push_str(rest);
        }
        self.predicates.push(rendered);
    }

    /// Add a left outer join, deduplicated by alias.
    pub fn left_join(
        &mut self,
        table: impl Into<String>,
        alias: impl Into<String>,
        on: impl Into<String>,
    ) {
        let alias = alias.into();
        if self.joins.iter().any(|j| j.alias == alias) {
            return;
        }
        self.joins.push(Join {
            table: table.into(),
            alias,
            on: on.into(),
        });
    }

    /// Append an ORDER BY entry.
    pub fn add_order_by(&mut self, expr: impl Into<String>, direction: SortDirection) {
        self.orders.push((expr.into(), direction));
    }

    /// Apply a validated window. An unbounded window leaves the query
    /// without LIMIT/OFFSET.
    pub fn window(&mut self, window: PageWindow) {
        if window.is_unbounded() {
            return;
        }
        self.limit = window.limit;
        self.offset = window.offset;
    }

    /// Cap the number of rows. 0 leaves the query uncapped.
    pub fn limit(&mut self, limit: u64) {
        self.limit = limit;
    }

    /// Skip leading rows, independently of any limit.
    pub fn offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    /// Apply sort orders: explicit `orders` if given, else `default_sorts`,
    /// else the deterministic fallback `<alias>.uuid ASC`.
    ///
    /// Multi-segment paths (`owner.name`) walk `relations` segment by
    /// segment, adding one left join per intermediate even when several
    /// sort fields share a prefix. An unregistered segment is an error.
    pub fn apply_sorts(
        &mut self,
        orders: Option<Vec<(String, SortDirection)>>,
        default_sorts: &[(&str, SortDirection)],
        relations: &[Relation],
    ) -> Result<(), RepositoryError> {
        let resolved: Vec<(String, SortDirection)> = match orders {
            Some(orders) => orders,
            None if !default_sorts.is_empty() => default_sorts
                .iter()
                .map(|(path, dir)| ((*path).to_string(), *dir))
                .collect(),
            None => vec![(format!("{}.uuid", self.alias), SortDirection::Asc)],
        };

        for (path, direction) in resolved {
            let expr = self.resolve_sort_path(&path, relations)?;
            self.add_order_by(expr, direction);
        }
        Ok(())
    }

    /// Resolve a sort path into a qualified column, joining relations as
    /// needed. `name` means a root column; `owner.name` joins `owner`.
    fn resolve_sort_path(
        &mut self,
        path: &str,
        relations: &[Relation],
    ) -> Result<String, RepositoryError> {
        let mut segments: Vec<&str> = path.split('.').collect();
        // A leading root alias is already qualified.
        if segments.len() > 1 && segments[0] == self.alias {
            segments.remove(0);
        }
        let column = segments.pop().unwrap_or(path);

        let mut parent = self.alias.clone();
        for segment in segments {
            let relation = relations
                .iter()
                .find(|r| r.name == segment)
                .ok_or_else(|| RepositoryError::unknown_relation(segment, path))?;
            let on = format!(
                "{parent}.{} = {}.{}",
                relation.parent_key, relation.name, relation.child_key
            );
            self.left_join(relation.table, relation.name, on);
            parent = relation.name.to_string();
        }

        Ok(format!("{parent}.{column}"))
    }

    /// Values bound so far, in positional order.
    #[must_use]
    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }

    /// Render the select statement.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&format!("{0}.* FROM {1} AS {0}", self.alias, self.table));
        self.render_joins_and_predicates(&mut sql);

        if !self.orders.is_empty() {
            let orders: Vec<String> = self
                .orders
                .iter()
                .map(|(expr, dir)| format!("{expr} {}", dir.as_sql()))
                .collect();
            sql.push_str(&format!(" ORDER BY {}", orders.join(", ")));
        }
        if self.limit > 0 {
            sql.push_str(&format!(" LIMIT {}", self.limit));
        }
        if self.offset > 0 {
            sql.push_str(&format!(" OFFSET {}", self.offset));
        }
        sql
    }

    /// Render the matching count statement over `count_column`, without
    /// ordering or window.
    #[must_use]
    pub fn to_count_sql(&self, count_column: &str) -> String {
        let mut sql = format!(
            "SELECT COUNT(DISTINCT {0}.{1}) FROM {2} AS {0}",
            self.alias, count_column, self.table
        );
        self.render_joins_and_predicates(&mut sql);
        sql
    }

    fn render_joins_and_predicates(&self, sql: &mut String) {
        for join in &self.joins {
            sql.push_str(&format!(
                " LEFT JOIN {} AS {} ON {}",
                join.table, join.alias, join.on
            ));
        }
        if !self.predicates.is_empty() {
            sql.push_str(&format!(" WHERE {}", self.predicates.join(" AND ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relations() -> Vec<Relation> {
        vec![
            Relation {
                name: "owner",
                table: "users",
                parent_key: "owner_id",
                child_key: "id",
            },
            Relation {
                name: "team",
                table: "teams",
                parent_key: "team_id",
                child_key: "id",
            },
        ]
    }

    #[test]
    fn test_plain_select() {
        let query = SelectQuery::new("users", "e");
        assert_eq!(query.to_sql(), "SELECT e.* FROM users AS e");
    }

    #[test]
    fn test_equality_predicates_bind_positionally() {
        let mut query = SelectQuery::new("users", "e").distinct();
        query.and_where_eq("e.status", "active");
        query.and_where_eq("e.admin", true);
        assert_eq!(
            query.to_sql(),
            "SELECT DISTINCT e.* FROM users AS e WHERE e.status = $1 AND e.admin = $2"
        );
        assert_eq!(
            query.binds(),
            [BindValue::Str("active".to_string()), BindValue::Bool(true)]
        );
    }

    #[test]
    fn test_raw_fragment_rewrites_placeholders() {
        let mut query = SelectQuery::new("users", "e");
        query.and_where_eq("e.status", "active");
        query.and_where(
            "(e.age > ? OR e.name = ?)",
            vec![BindValue::Int(18), BindValue::from("root")],
        );
        assert_eq!(
            query.to_sql(),
            "SELECT e.* FROM users AS e WHERE e.status = $1 AND (e.age > $2 OR e.name = $3)"
        );
    }

    #[test]
    fn test_window_applies_limit_offset() {
        let mut query = SelectQuery::new("users", "e");
        query.window(PageWindow { offset: 20, limit: 10 });
        assert_eq!(query.to_sql(), "SELECT e.* FROM users AS e LIMIT 10 OFFSET 20");
    }

    #[test]
    fn test_offset_renders_without_limit() {
        let mut query = SelectQuery::new("users", "e");
        query.offset(15);
        assert_eq!(query.to_sql(), "SELECT e.* FROM users AS e OFFSET 15");
    }

    #[test]
    fn test_unbounded_window_is_noop() {
        let mut query = SelectQuery::new("users", "e");
        query.window(PageWindow::default());
        assert_eq!(query.to_sql(), "SELECT e.* FROM users AS e");
    }

    #[test]
    fn test_fallback_sort_is_uuid_asc() {
        let mut query = SelectQuery::new("users", "e");
        query.apply_sorts(None, &[], &[]).unwrap();
        assert_eq!(query.to_sql(), "SELECT e.* FROM users AS e ORDER BY e.uuid ASC");
    }

    #[test]
    fn test_default_sorts_used_when_no_explicit_orders() {
        let mut query = SelectQuery::new("users", "e");
        query
            .apply_sorts(None, &[("name", SortDirection::Desc)], &[])
            .unwrap();
        assert_eq!(
            query.to_sql(),
            "SELECT e.* FROM users AS e ORDER BY e.name DESC"
        );
    }

    #[test]
    fn test_relation_sort_adds_left_join() {
        let mut query = SelectQuery::new("projects", "e");
        query
            .apply_sorts(
                Some(vec![("owner.name".to_string(), SortDirection::Asc)]),
                &[],
                &relations(),
            )
            .unwrap();
        assert_eq!(
            query.to_sql(),
            "SELECT e.* FROM projects AS e \
             LEFT JOIN users AS owner ON e.owner_id = owner.id \
             ORDER BY owner.name ASC"
        );
    }

    #[test]
    fn test_shared_relation_joined_once() {
        let mut query = SelectQuery::new("projects", "e");
        query
            .apply_sorts(
                Some(vec![
                    ("owner.name".to_string(), SortDirection::Asc),
                    ("owner.email".to_string(), SortDirection::Desc),
                ]),
                &[],
                &relations(),
            )
            .unwrap();
        let sql = query.to_sql();
        assert_eq!(sql.matches("LEFT JOIN users AS owner").count(), 1);
        assert!(sql.ends_with("ORDER BY owner.name ASC, owner.email DESC"));
    }

    #[test]
    fn test_root_alias_prefix_accepted() {
        let mut query = SelectQuery::new("users", "e");
        query
            .apply_sorts(
                Some(vec![("e.name".to_string(), SortDirection::Asc)]),
                &[],
                &[],
            )
            .unwrap();
        assert_eq!(query.to_sql(), "SELECT e.* FROM users AS e ORDER BY e.name ASC");
    }

    #[test]
    fn test_unknown_relation_is_error() {
        let mut query = SelectQuery::new("projects", "e");
        let err = query
            .apply_sorts(
                Some(vec![("manager.name".to_string(), SortDirection::Asc)]),
                &[],
                &relations(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("manager"));
    }

    #[test]
    fn test_count_sql_drops_order_and_window() {
        let mut query = SelectQuery::new("users", "e").distinct();
        query.and_where_eq("e.status", "active");
        query.window(PageWindow { offset: 10, limit: 10 });
        query.apply_sorts(None, &[], &[]).unwrap();
        assert_eq!(
            query.to_count_sql("id"),
            "SELECT COUNT(DISTINCT e.id) FROM users AS e WHERE e.status = $1"
        );
    }
}
