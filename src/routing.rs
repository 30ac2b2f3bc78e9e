//! Generic resource routing
//!
//! [`resource_routes`] wires one [`RestResource`] implementation into the
//! conventional CRUD surface:
//!
//! ```text
//! GET    /<res>          list, {"items": [...], "total": n}
//! POST   /<res>          create, 201
//! GET    /<res>/{uuid}   fetch one
//! PUT    /<res>/{uuid}   update
//! PATCH  /<res>/{uuid}   update
//! DELETE /<res>/{uuid}   delete, 204
//! ```
//!
//! [`with_problem_fallbacks`] makes unmatched routes and disallowed
//! methods render problem responses instead of axum's plain-text
//! defaults.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::problem::{codes, ApiError};
use crate::repository::{SearchParams, SearchResult};

/// The operations a routed resource exposes.
pub trait RestResource: Send + Sync + 'static {
    type Entity: Serialize + Send;

    fn list(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<SearchResult<Self::Entity>, ApiError>> + Send;

    fn get(&self, id: Uuid) -> impl Future<Output = Result<Self::Entity, ApiError>> + Send;

    fn create(&self, input: Value) -> impl Future<Output = Result<Self::Entity, ApiError>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: Value,
    ) -> impl Future<Output = Result<Self::Entity, ApiError>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// List response body.
#[derive(Debug, Serialize)]
pub struct SearchBody<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> From<SearchResult<T>> for SearchBody<T> {
    fn from(result: SearchResult<T>) -> Self {
        Self {
            items: result.items,
            total: result.total,
        }
    }
}

fn parse_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    // An unparseable id can never name an existing resource.
    id.map(|Path(id)| id).map_err(|_| ApiError::RouteNotFound)
}

fn parse_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|_| ApiError::bad_request(codes::INVALID_FORMAT))
}

/// Routes for one resource mounted at `/<path>`.
pub fn resource_routes<R: RestResource>(path: &str, resource: Arc<R>) -> Router {
    let list = {
        let resource = Arc::clone(&resource);
        move |Query(query): Query<HashMap<String, String>>| {
            let resource = Arc::clone(&resource);
            async move {
                let params = SearchParams::from_query(query);
                let result = resource.list(params).await?;
                Ok::<_, ApiError>(Json(SearchBody::from(result)))
            }
        }
    };

    let create = {
        let resource = Arc::clone(&resource);
        move |body: Result<Json<Value>, JsonRejection>| {
            let resource = Arc::clone(&resource);
            async move {
                let input = parse_body(body)?;
                let entity = resource.create(input).await?;
                Ok::<_, ApiError>((StatusCode::CREATED, Json(entity)))
            }
        }
    };

    let fetch = {
        let resource = Arc::clone(&resource);
        move |id: Result<Path<Uuid>, PathRejection>| {
            let resource = Arc::clone(&resource);
            async move {
                let entity = resource.get(parse_id(id)?).await?;
                Ok::<_, ApiError>(Json(entity))
            }
        }
    };

    let update = {
        let resource = Arc::clone(&resource);
        move |id: Result<Path<Uuid>, PathRejection>,
              body: Result<Json<Value>, JsonRejection>| {
            let resource = Arc::clone(&resource);
            async move {
                let entity = resource.update(parse_id(id)?, parse_body(body)?).await?;
                Ok::<_, ApiError>(Json(entity))
            }
        }
    };

    let remove = {
        let resource = Arc::clone(&resource);
        move |id: Result<Path<Uuid>, PathRejection>| {
            let resource = Arc::clone(&resource);
            async move {
                resource.delete(parse_id(id)?).await?;
                Ok::<_, ApiError>(StatusCode::NO_CONTENT)
            }
        }
    };

    Router::new()
        .route(&format!("/{path}"), get(list).post(create))
        .route(
            &format!("/{path}/{{id}}"),
            get(fetch)
                .put(update.clone())
                .patch(update)
                .delete(remove),
        )
}

/// Replace axum's plain-text 404/405 responses with problem responses.
/// The method-not-allowed response keeps its 405 status but carries the
/// `route.not_found` code.
pub fn with_problem_fallbacks(router: Router) -> Router {
    router
        .fallback(|| async { ApiError::RouteNotFound })
        .method_not_allowed_fallback(|| async { ApiError::MethodNotAllowed })
}
