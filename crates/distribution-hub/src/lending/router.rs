use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::import::{import_products, ImportError, ImportReport};
use super::product::Product;
use crate::records::extract::ApiPath;
use crate::records::{CrudService, RecordId};

/// Catalog upload route; the CSV travels as the raw request body.
pub fn product_import_router(service: Arc<CrudService<Product>>) -> Router {
    Router::new()
        .route(
            "/api/v1/distributors/:id/products/import",
            post(import_handler),
        )
        .with_state(service)
}

pub(crate) async fn import_handler(
    State(service): State<Arc<CrudService<Product>>>,
    ApiPath(distributor_id): ApiPath<RecordId>,
    body: Bytes,
) -> Result<Json<ImportReport>, ImportError> {
    import_products(&service, distributor_id, Cursor::new(body)).map(Json)
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        match self {
            ImportError::Service(error) => error.into_response(),
            ImportError::Csv(_) | ImportError::MissingColumn(_) => {
                let body = Json(json!({ "error": self.to_string() }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
