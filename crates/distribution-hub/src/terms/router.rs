use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::document::TermsDocument;
use super::renewal::RenewalOutcome;
use super::schema::VariableReport;
use super::service::{GenerationRequest, TermsError, TermsService};
use super::template::{TemplateCategory, TermsTemplate};
use crate::records::extract::{ApiJson, ApiPath};
use crate::records::router::{delete_handler, filter_handler, get_handler};
use crate::records::{crud_router, Record, RecordId, ServiceError};

/// Template CRUD, generation, the document lifecycle, and renewals.
pub fn terms_router(service: Arc<TermsService>) -> Router {
    let documents = Router::new()
        .route(
            "/api/v1/terms/documents/filter",
            post(filter_handler::<TermsDocument>),
        )
        .route(
            "/api/v1/terms/documents/:id",
            get(get_handler::<TermsDocument>).delete(delete_handler::<TermsDocument>),
        )
        .with_state(service.documents().clone());

    let engine = Router::new()
        .route("/api/v1/terms/templates/:id/approve", post(approve_handler))
        .route("/api/v1/terms/templates/:id/default", post(set_default_handler))
        .route(
            "/api/v1/terms/templates/default/:category",
            get(default_template_handler),
        )
        .route("/api/v1/terms/templates/:id/validate", post(validate_handler))
        .route("/api/v1/terms/preview", post(preview_handler))
        .route("/api/v1/terms/generate", post(generate_handler))
        .route("/api/v1/terms/documents/:id/sign", post(sign_handler))
        .route("/api/v1/terms/documents/:id/terminate", post(terminate_handler))
        .route("/api/v1/distributors/:id/terms/active", get(active_handler))
        .route("/api/v1/terms/renewals", post(renewals_handler))
        .with_state(service.clone());

    crud_router("/api/v1/terms/templates", service.templates().clone())
        .merge(documents)
        .merge(engine)
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved_by: String,
}

#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    pub signed_by: String,
}

#[derive(Debug, Deserialize)]
pub struct VariablesRequest {
    #[serde(default)]
    pub variables: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenewalRequest {
    #[serde(default)]
    pub distributor_id: Option<RecordId>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct VariableCheck {
    pub valid: bool,
    #[serde(flatten)]
    pub report: VariableReport,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn approve_handler(
    State(service): State<Arc<TermsService>>,
    ApiPath(id): ApiPath<RecordId>,
    ApiJson(request): ApiJson<ApprovalRequest>,
) -> Result<Json<Record<TermsTemplate>>, ServiceError> {
    service.templates().approve(id, &request.approved_by).map(Json)
}

async fn set_default_handler(
    State(service): State<Arc<TermsService>>,
    ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Record<TermsTemplate>>, ServiceError> {
    service.templates().set_default(id).map(Json)
}

async fn default_template_handler(
    State(service): State<Arc<TermsService>>,
    ApiPath(category): ApiPath<TemplateCategory>,
) -> Result<Json<Record<TermsTemplate>>, ServiceError> {
    service
        .templates()
        .default_for(category)?
        .map(Json)
        .ok_or_else(|| ServiceError::Absent(format!("no default {category} terms template")))
}

async fn validate_handler(
    State(service): State<Arc<TermsService>>,
    ApiPath(id): ApiPath<RecordId>,
    ApiJson(request): ApiJson<VariablesRequest>,
) -> Result<Json<VariableCheck>, TermsError> {
    let report = service.validate(id, &request.variables)?;
    Ok(Json(VariableCheck {
        valid: report.is_valid(),
        report,
    }))
}

async fn preview_handler(
    State(service): State<Arc<TermsService>>,
    ApiJson(request): ApiJson<GenerationRequest>,
) -> Result<Json<TermsDocument>, TermsError> {
    service.preview(&request, today()).map(Json)
}

async fn generate_handler(
    State(service): State<Arc<TermsService>>,
    ApiJson(request): ApiJson<GenerationRequest>,
) -> Result<(StatusCode, Json<Record<TermsDocument>>), TermsError> {
    let record = service.generate(&request, today())?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn sign_handler(
    State(service): State<Arc<TermsService>>,
    ApiPath(id): ApiPath<RecordId>,
    ApiJson(request): ApiJson<SignatureRequest>,
) -> Result<Json<Record<TermsDocument>>, TermsError> {
    service.sign(id, &request.signed_by).map(Json)
}

async fn terminate_handler(
    State(service): State<Arc<TermsService>>,
    ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Record<TermsDocument>>, TermsError> {
    service.terminate(id).map(Json)
}

async fn active_handler(
    State(service): State<Arc<TermsService>>,
    ApiPath(distributor_id): ApiPath<RecordId>,
) -> Result<Json<Record<TermsDocument>>, TermsError> {
    service
        .active_for(distributor_id, today())?
        .map(Json)
        .ok_or_else(|| {
            ServiceError::Absent(format!(
                "distributor {distributor_id} has no terms in force"
            ))
            .into()
        })
}

async fn renewals_handler(
    State(service): State<Arc<TermsService>>,
    ApiJson(request): ApiJson<RenewalRequest>,
) -> Result<Json<RenewalOutcome>, TermsError> {
    let day = request.today.unwrap_or_else(today);
    service.run_renewals(request.distributor_id, day).map(Json)
}

impl TermsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TermsError::Service(error) => error.status_code(),
            TermsError::TemplateInactive(_) | TermsError::TemplateNotApproved(_) => {
                StatusCode::CONFLICT
            }
            TermsError::InvalidVariables(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for TermsError {
    fn into_response(self) -> Response {
        match self {
            TermsError::Service(error) => error.into_response(),
            other => {
                let status = other.status_code();
                let body = match &other {
                    TermsError::InvalidVariables(report) => {
                        json!({ "error": other.to_string(), "details": report })
                    }
                    _ => {
                        warn!(error = %other, "terms request refused");
                        json!({ "error": other.to_string() })
                    }
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
