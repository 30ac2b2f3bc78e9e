//! Problem details value object
//!
//! [`ApiProblem`] holds the data for an `application/problem+json` response:
//! an HTTP status, a list of machine-readable error codes, and optional
//! extra data merged into the response body.
//!
//! Raw failure messages coming from framework layers are recognized by
//! pattern and rewritten into stable codes during construction; everything
//! else passes through (optionally prefixed with the configured namespace).
//!
//! # Example
//!
//! ```rust
//! use axum::http::StatusCode;
//! use restkit::problem::{codes, ApiProblem};
//!
//! let problem = ApiProblem::new(StatusCode::BAD_REQUEST, codes::PAGINATION_INCORRECT_PAGE_VALUE);
//! assert_eq!(problem.errors(), ["error.pagination.incorrect_page_value"]);
//! ```

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::naming::normalize_type_name;

/// Stable error codes shared by all resources.
pub mod codes {
    /// Namespace prefix applied to every code unless suppressed.
    pub const PREFIX: &str = "error.";

    /// Redacted unexpected failure (500 outside verbose mode).
    pub const UNEXPECTED_ERROR: &str = "something.went.wrong";

    /// Malformed message body (400).
    pub const INVALID_FORMAT: &str = "invalid.format.message";
    /// Submitted data could not be applied to the entity (400).
    pub const INVALID_DATA_SUBMITTED: &str = "invalid.data.submitted";
    /// Unknown route or resource (404), also used for 405.
    pub const ROUTE_NOT_FOUND: &str = "route.not_found";

    /// Generic authentication failure (401).
    pub const AUTHENTICATION_FAILURE: &str = "bad_credentials";
    /// Authorization denial (403).
    pub const RESTRICTED_ACCESS: &str = "restricted_access";
    /// Credential token missing from the request (401).
    pub const TOKEN_MISSING: &str = "missing_token";
    /// Credential token present but invalid (401).
    pub const TOKEN_INVALID: &str = "invalid_token";
    /// Credential token expired (401).
    pub const TOKEN_EXPIRED: &str = "token_expired";

    /// Unknown sort field (400).
    pub const RESULT_ORDER_INCORRECT: &str = "order.incorrect_order";
    /// Sort expression does not match the grammar (400).
    pub const RESULT_SORT_MALFORMED: &str = "sort.malformed";
    /// Page parameter is not a positive integer (400).
    pub const PAGINATION_INCORRECT_PAGE_VALUE: &str = "pagination.incorrect_page_value";
    /// Results-per-page parameter is not a positive integer (400).
    pub const PAGINATION_INCORRECT_RESULTS_PER_PAGE_VALUE: &str =
        "pagination.incorrect_results_per_page_value";

    /// `<slug>.not_found` for a registered resource slug.
    #[must_use]
    pub fn entity_not_found(slug: &str) -> String {
        format!("{slug}.not_found")
    }

    /// `<slug>.not_deletable` for a registered resource slug.
    #[must_use]
    pub fn entity_not_deletable(slug: &str) -> String {
        format!("{slug}.not_deletable")
    }

    /// `<slug>.duplicated` for a registered resource slug.
    #[must_use]
    pub fn entity_duplicated(slug: &str) -> String {
        format!("{slug}.duplicated")
    }

    /// `<slug>.not_editable` for a registered resource slug.
    #[must_use]
    pub fn entity_not_editable(slug: &str) -> String {
        format!("{slug}.not_editable")
    }
}

static INVALID_FORMAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Invalid [A-Za-z]+ message received$").expect("valid regex"));
static TOKEN_MISSING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^A Token was not found").expect("valid regex"));
static TOKEN_EXPIRED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Expired (JWT )?[Tt]oken").expect("valid regex"));
static TOKEN_INVALID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Invalid (JWT )?[Tt]oken").expect("valid regex"));
static BAD_CREDENTIALS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Bad credentials").expect("valid regex"));
static ACCESS_DENIED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Token does not have the required roles|Access Denied\.)$").expect("valid regex")
});
static ENTITY_NOT_FOUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*(?:\\|::)[Ee]ntity(?:\\|::)(.*) object not found").expect("valid regex")
});
static NO_ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^No route found for").expect("valid regex"));

/// Data for an `application/problem+json` response.
///
/// Created per failed request and discarded after the response is
/// serialized. The status code may be rewritten during normalization but
/// the object has no further lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiProblem {
    status: StatusCode,
    errors: Vec<String>,
    extra: Map<String, Value>,
}

impl ApiProblem {
    /// Build a problem from a single error code or raw message, applying
    /// the configured code prefix.
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self::with_errors(status, vec![error.into()], Some(super::options().prefix))
    }

    /// Build a problem from a single error without applying any prefix.
    pub fn unprefixed(status: StatusCode, error: impl Into<String>) -> Self {
        Self::with_errors(status, vec![error.into()], None)
    }

    /// Build a problem from several errors, with an explicit prefix
    /// (`None` suppresses prefixing).
    #[must_use]
    pub fn with_errors(status: StatusCode, errors: Vec<String>, prefix: Option<String>) -> Self {
        let normalized = errors
            .into_iter()
            .map(|e| normalize_error(status, &e, prefix.as_deref()))
            .collect();
        Self {
            status,
            errors: normalized,
            extra: Map::new(),
        }
    }

    /// HTTP status for the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Normalized error codes, in order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Attach extra data merged into the response body next to `errors`.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.extra.insert(name.into(), value);
    }

    /// Remove an extra-data entry.
    pub fn unset(&mut self, name: &str) {
        self.extra.remove(name);
    }

    /// Response body: extra data merged with `{"errors": [...]}`.
    #[must_use]
    pub fn body(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert(
            "errors".to_string(),
            Value::Array(self.errors.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(map)
    }
}

/// Rewrite a raw failure message into a stable code where a pattern
/// matches for the given status, then apply the prefix.
fn normalize_error(status: StatusCode, raw: &str, prefix: Option<&str>) -> String {
    let code = match status {
        StatusCode::BAD_REQUEST if INVALID_FORMAT_RE.is_match(raw) => {
            codes::INVALID_FORMAT.to_string()
        }
        StatusCode::UNAUTHORIZED if TOKEN_MISSING_RE.is_match(raw) => {
            codes::TOKEN_MISSING.to_string()
        }
        StatusCode::UNAUTHORIZED if TOKEN_EXPIRED_RE.is_match(raw) => {
            codes::TOKEN_EXPIRED.to_string()
        }
        StatusCode::UNAUTHORIZED if TOKEN_INVALID_RE.is_match(raw) => {
            codes::TOKEN_INVALID.to_string()
        }
        StatusCode::UNAUTHORIZED if BAD_CREDENTIALS_RE.is_match(raw) => {
            codes::AUTHENTICATION_FAILURE.to_string()
        }
        StatusCode::FORBIDDEN if ACCESS_DENIED_RE.is_match(raw) => {
            codes::RESTRICTED_ACCESS.to_string()
        }
        StatusCode::NOT_FOUND => {
            if let Some(captures) = ENTITY_NOT_FOUND_RE.captures(raw) {
                codes::entity_not_found(&normalize_type_name(&captures[1]))
            } else if NO_ROUTE_RE.is_match(raw) {
                codes::ROUTE_NOT_FOUND.to_string()
            } else {
                raw.to_string()
            }
        }
        // Method-not-allowed deliberately collapses into not-found
        // semantics; the status code still distinguishes the two.
        StatusCode::METHOD_NOT_ALLOWED => codes::ROUTE_NOT_FOUND.to_string(),
        _ => raw.to_string(),
    };

    match prefix {
        Some(p) => format!("{p}{code}"),
        None => code,
    }
}
