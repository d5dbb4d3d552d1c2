//! # HTTP controller
//!
//! Exposes a [`CrudService`] as five axum routes:
//!
//! | Method   | Path          | Status |
//! |----------|---------------|--------|
//! | `POST`   | `{base}`      | 201    |
//! | `PUT`    | `{base}/{id}` | 200    |
//! | `GET`    | `{base}/{id}` | 200    |
//! | `GET`    | `{base}`      | 200    |
//! | `DELETE` | `{base}/{id}` | 204    |
//!
//! Handlers only extract and delegate. Bodies go through [`ValidJson`], so
//! the service never sees a request that failed to parse or validate.
//!
//! ```rust,ignore
//! // paging and actor settings come from the service's configuration
//! let todos = CrudController::new(service).router("/todos");
//! let app = Router::new().nest("/api/v1", todos);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, RawQuery, State, rejection::PathRejection, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::audit::Actor;
use crate::config::CrudConfig;
use crate::errors::{ApiError, HttpServiceError};
use crate::page::Page;
use crate::pageable::Pageable;
use crate::service::CrudService;
use crate::validation::{Validatable, ValidJson};

/// Router state shared by the generated handlers.
pub struct CrudState<S> {
    pub service: Arc<S>,
    pub config: Arc<CrudConfig>,
}

impl<S> Clone for CrudState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> FromRef<CrudState<S>> for Arc<CrudConfig> {
    fn from_ref(state: &CrudState<S>) -> Self {
        Arc::clone(&state.config)
    }
}

pub struct CrudController<S> {
    state: CrudState<S>,
}

impl<S> CrudController<S>
where
    S: CrudService,
    S::Id: DeserializeOwned,
    S::Request: DeserializeOwned + Validatable,
    S::Query: DeserializeOwned,
    S::Response: Serialize,
{
    pub fn new(service: S) -> Self {
        Self::from_arc(Arc::new(service))
    }

    /// Share a service that is also used outside the router.
    pub fn from_arc(service: Arc<S>) -> Self {
        let config = service.config();
        Self {
            state: CrudState { service, config },
        }
    }

    /// Replace the configuration taken from the service for these routes
    /// (paging limits and actor resolution only).
    #[must_use]
    pub fn with_config(mut self, config: Arc<CrudConfig>) -> Self {
        self.state.config = config;
        self
    }

    /// Build the routes under `base_path`, e.g. `"/todos"`.
    pub fn router(self, base_path: &str) -> Router {
        let base = base_path.trim_end_matches('/');
        let item = format!("{base}/{{id}}");
        let collection = if base.is_empty() { "/" } else { base };

        Router::new()
            .route(collection, get(get_all::<S>).post(create_one::<S>))
            .route(
                &item,
                get(get_one::<S>).put(update_one::<S>).delete(delete_one::<S>),
            )
            .with_state(self.state)
    }
}

fn path_error(rejection: &PathRejection) -> ApiError {
    HttpServiceError::new(rejection.status(), rejection.body_text()).into()
}

fn query_error(rejection: &QueryRejection) -> ApiError {
    HttpServiceError::new(rejection.status(), rejection.body_text()).into()
}

async fn create_one<S>(
    State(state): State<CrudState<S>>,
    actor: Actor,
    ValidJson(request): ValidJson<S::Request>,
) -> Result<(StatusCode, Json<S::Response>), ApiError>
where
    S: CrudService,
    S::Request: DeserializeOwned + Validatable,
    S::Response: Serialize,
{
    let created = state.service.create_one(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_one<S>(
    State(state): State<CrudState<S>>,
    actor: Actor,
    id: Result<Path<S::Id>, PathRejection>,
    ValidJson(request): ValidJson<S::Request>,
) -> Result<Json<S::Response>, ApiError>
where
    S: CrudService,
    S::Id: DeserializeOwned,
    S::Request: DeserializeOwned + Validatable,
    S::Response: Serialize,
{
    let Path(id) = id.map_err(|rejection| path_error(&rejection))?;
    let updated = state.service.update_one(&actor, id, request).await?;
    Ok(Json(updated))
}

async fn get_one<S>(
    State(state): State<CrudState<S>>,
    id: Result<Path<S::Id>, PathRejection>,
) -> Result<Json<S::Response>, ApiError>
where
    S: CrudService,
    S::Id: DeserializeOwned,
    S::Response: Serialize,
{
    let Path(id) = id.map_err(|rejection| path_error(&rejection))?;
    Ok(Json(state.service.get_one(id).await?))
}

async fn get_all<S>(
    State(state): State<CrudState<S>>,
    RawQuery(raw): RawQuery,
    query: Result<Query<S::Query>, QueryRejection>,
) -> Result<(HeaderMap, Json<Page<S::Response>>), ApiError>
where
    S: CrudService,
    S::Query: DeserializeOwned,
    S::Response: Serialize,
{
    let Query(query) = query.map_err(|rejection| query_error(&rejection))?;
    let pageable = Pageable::from_query(raw.as_deref(), &state.config.paging)?;

    let page = state.service.get_all(query, pageable).await?;
    let headers = page.content_range(state.service.resource_name());
    Ok((headers, Json(page)))
}

async fn delete_one<S>(
    State(state): State<CrudState<S>>,
    id: Result<Path<S::Id>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
    S: CrudService,
    S::Id: DeserializeOwned,
{
    let Path(id) = id.map_err(|rejection| path_error(&rejection))?;
    state.service.delete_one(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
