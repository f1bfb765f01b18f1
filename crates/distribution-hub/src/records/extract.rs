use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// JSON body extractor whose rejection is rendered as `{ "error": .. }`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(RequestRejection))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejection is rendered as `{ "error": .. }`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(RequestRejection))]
pub struct ApiPath<T>(pub T);

/// A request that never reached a handler: bad body or bad path segment.
#[derive(Debug)]
pub struct RequestRejection {
    status: StatusCode,
    message: String,
}

impl RequestRejection {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for RequestRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for RequestRejection {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for RequestRejection {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
