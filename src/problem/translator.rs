//! Request-failure taxonomy and translation to problem responses
//!
//! [`ApiError`] is the error type handlers and repositories return. Its
//! [`IntoResponse`] impl logs the failure with structured context and then
//! renders the corresponding [`ApiProblem`] as `application/problem+json`.
//!
//! Internal failures are redacted to a generic code in production; when
//! verbose mode is installed (dev/test environments) the raw message and
//! the failure kind are surfaced instead.
//!
//! # Example
//!
//! ```rust
//! use axum::http::StatusCode;
//! use restkit::problem::ApiError;
//!
//! let err = ApiError::not_found("user");
//! let problem = err.to_problem();
//! assert_eq!(problem.status(), StatusCode::NOT_FOUND);
//! assert_eq!(problem.errors(), ["error.user.not_found"]);
//! ```

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use super::details::{codes, ApiProblem};
use super::{options, ProblemOptions};

/// Which authentication failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No credential token on the request.
    MissingToken,
    /// Token present but unparseable or tampered.
    InvalidToken,
    /// Token parsed but past its expiry.
    TokenExpired,
    /// Credentials rejected by the authenticator.
    BadCredentials,
}

impl AuthErrorKind {
    /// Stable error code for this failure.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingToken => codes::TOKEN_MISSING,
            Self::InvalidToken => codes::TOKEN_INVALID,
            Self::TokenExpired => codes::TOKEN_EXPIRED,
            Self::BadCredentials => codes::AUTHENTICATION_FAILURE,
        }
    }
}

/// Request-failure taxonomy rendered as problem responses.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ApiError {
    /// Client-side request error with a stable code (400).
    #[error("bad request: {code}")]
    BadRequest { code: String },

    /// Authentication failure (401).
    #[error("unauthorized: {0:?}")]
    Unauthorized(AuthErrorKind),

    /// Authorization denial (403).
    #[error("access denied")]
    Forbidden,

    /// A registered resource was not found (404).
    #[error("{slug} not found")]
    NotFound { slug: String },

    /// No route matched the request (404).
    #[error("no route matched")]
    RouteNotFound,

    /// Route matched but the method is not allowed (405).
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Submitted data failed validation (422).
    #[error("unprocessable: {errors:?}")]
    Unprocessable { errors: Vec<String> },

    /// Deletion rejected, usually by a storage constraint (400).
    #[error("{slug} not deletable")]
    NotDeletable { slug: String },

    /// Unexpected server-side failure (500).
    #[error("internal error: {message}")]
    Internal { message: String, kind: String },
}

impl ApiError {
    /// A 400 with the given stable code.
    pub fn bad_request(code: impl Into<String>) -> Self {
        Self::BadRequest { code: code.into() }
    }

    /// A 404 for the resource registered under `slug`.
    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }

    /// A 400 `<slug>.not_deletable`.
    pub fn not_deletable(slug: impl Into<String>) -> Self {
        Self::NotDeletable { slug: slug.into() }
    }

    /// A 422 carrying one code per invalid field.
    #[must_use]
    pub fn unprocessable(errors: Vec<String>) -> Self {
        Self::Unprocessable { errors }
    }

    /// A 500 capturing the source error's type name as its kind.
    pub fn internal<E: std::error::Error>(source: &E) -> Self {
        Self::Internal {
            message: source.to_string(),
            kind: short_type_name(std::any::type_name::<E>()),
        }
    }

    /// A 500 from a bare message.
    pub fn internal_message(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            kind: "Error".to_string(),
        }
    }

    /// HTTP status this error renders with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::NotDeletable { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound { .. } | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Translate into a problem using the installed options.
    #[must_use]
    pub fn to_problem(&self) -> ApiProblem {
        self.to_problem_with(&options())
    }

    /// Translate into a problem with explicit options.
    #[must_use]
    pub fn to_problem_with(&self, opts: &ProblemOptions) -> ApiProblem {
        let prefix = Some(opts.prefix.clone());
        match self {
            Self::BadRequest { code } => {
                ApiProblem::with_errors(StatusCode::BAD_REQUEST, vec![code.clone()], prefix)
            }
            Self::Unauthorized(kind) => ApiProblem::with_errors(
                StatusCode::UNAUTHORIZED,
                vec![kind.code().to_string()],
                prefix,
            ),
            Self::Forbidden => ApiProblem::with_errors(
                StatusCode::FORBIDDEN,
                vec![codes::RESTRICTED_ACCESS.to_string()],
                prefix,
            ),
            Self::NotFound { slug } => ApiProblem::with_errors(
                StatusCode::NOT_FOUND,
                vec![codes::entity_not_found(slug)],
                prefix,
            ),
            Self::RouteNotFound => ApiProblem::with_errors(
                StatusCode::NOT_FOUND,
                vec![codes::ROUTE_NOT_FOUND.to_string()],
                prefix,
            ),
            Self::MethodNotAllowed => ApiProblem::with_errors(
                StatusCode::METHOD_NOT_ALLOWED,
                vec![codes::ROUTE_NOT_FOUND.to_string()],
                prefix,
            ),
            Self::Unprocessable { errors } => ApiProblem::with_errors(
                StatusCode::UNPROCESSABLE_ENTITY,
                errors.clone(),
                prefix,
            ),
            Self::NotDeletable { slug } => ApiProblem::with_errors(
                StatusCode::BAD_REQUEST,
                vec![codes::entity_not_deletable(slug)],
                prefix,
            ),
            Self::Internal { message, kind } => {
                if opts.verbose {
                    ApiProblem::with_errors(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        vec![format!("{message} ({kind})")],
                        None,
                    )
                } else {
                    let mut problem = ApiProblem::with_errors(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        vec![codes::UNEXPECTED_ERROR.to_string()],
                        prefix,
                    );
                    problem.set("redacted", Value::Bool(true));
                    problem
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let problem = self.to_problem();
        tracing::error!(
            status = %problem.status(),
            error = %self,
            "request failed"
        );
        problem.into_response()
    }
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(self.body())).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Last path segment of a fully qualified type name.
fn short_type_name(full: &str) -> String {
    full.rsplit("::").next().unwrap_or(full).to_string()
}
