use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::entity::{Entity, Lifecycle, Record, RecordId};
use super::extract::{ApiJson, ApiPath};
use super::filter::{FilterRequest, Page};
use super::repository::RepositoryError;
use super::service::{CrudService, ServiceError};

/// Mounts filter/create/get/update/delete for `E` under `base`.
pub fn crud_router<E: Entity>(base: &str, service: Arc<CrudService<E>>) -> Router {
    Router::new()
        .route(&format!("{base}/filter"), post(filter_handler::<E>))
        .route(base, post(create_handler::<E>))
        .route(
            &format!("{base}/:id"),
            get(get_handler::<E>)
                .put(update_handler::<E>)
                .delete(delete_handler::<E>),
        )
        .with_state(service)
}

/// Mounts `POST {base}/:id/status` for entities with a status lifecycle.
pub fn status_router<E>(base: &str, service: Arc<CrudService<E>>) -> Router
where
    E: Lifecycle,
    E::Status: DeserializeOwned,
{
    Router::new()
        .route(&format!("{base}/:id/status"), post(status_handler::<E>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct StatusChange<S> {
    pub status: S,
}

pub(crate) async fn status_handler<E>(
    State(service): State<Arc<CrudService<E>>>,
    ApiPath(id): ApiPath<RecordId>,
    ApiJson(change): ApiJson<StatusChange<E::Status>>,
) -> Result<Json<Record<E>>, ServiceError>
where
    E: Lifecycle,
    E::Status: DeserializeOwned,
{
    service.transition(id, change.status).map(Json)
}

pub(crate) async fn filter_handler<E: Entity>(
    State(service): State<Arc<CrudService<E>>>,
    ApiJson(request): ApiJson<FilterRequest>,
) -> Result<Json<Page<Record<E>>>, ServiceError> {
    service.filter(&request).map(Json)
}

pub(crate) async fn create_handler<E: Entity>(
    State(service): State<Arc<CrudService<E>>>,
    ApiJson(payload): ApiJson<E>,
) -> Result<(StatusCode, Json<Record<E>>), ServiceError> {
    let record = service.create(payload)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn get_handler<E: Entity>(
    State(service): State<Arc<CrudService<E>>>,
    ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Record<E>>, ServiceError> {
    service.get(id).map(Json)
}

pub(crate) async fn update_handler<E: Entity>(
    State(service): State<Arc<CrudService<E>>>,
    ApiPath(id): ApiPath<RecordId>,
    ApiJson(payload): ApiJson<E>,
) -> Result<Json<Record<E>>, ServiceError> {
    service.update(id, payload).map(Json)
}

pub(crate) async fn delete_handler<E: Entity>(
    State(service): State<Arc<CrudService<E>>>,
    ApiPath(id): ApiPath<RecordId>,
) -> Result<StatusCode, ServiceError> {
    service.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::NotFound { .. }
            | ServiceError::Absent(_)
            | ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            ServiceError::InvalidTransition { .. }
            | ServiceError::Conflict(_)
            | ServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            ServiceError::Repository(RepositoryError::Unavailable(_))
            | ServiceError::Filter(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(error = %self, "record operation failed");
        }

        let body = match &self {
            ServiceError::Validation(error) => json!({
                "error": self.to_string(),
                "details": error.fields,
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
