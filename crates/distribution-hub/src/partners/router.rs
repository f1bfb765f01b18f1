use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use super::payment_method::AgencyPaymentMethod;
use crate::records::extract::ApiPath;
use crate::records::{CrudService, Record, RecordId, ServiceError};

/// Primary-method routes layered next to the generic payment method CRUD routes.
pub fn payment_method_router(service: Arc<CrudService<AgencyPaymentMethod>>) -> Router {
    Router::new()
        .route(
            "/api/v1/agency-payment-methods/:id/primary",
            post(set_primary_handler),
        )
        .route(
            "/api/v1/agencies/:id/payment-methods/primary",
            get(primary_handler),
        )
        .with_state(service)
}

pub(crate) async fn set_primary_handler(
    State(service): State<Arc<CrudService<AgencyPaymentMethod>>>,
    ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Record<AgencyPaymentMethod>>, ServiceError> {
    service.set_primary(id).map(Json)
}

pub(crate) async fn primary_handler(
    State(service): State<Arc<CrudService<AgencyPaymentMethod>>>,
    ApiPath(agency_id): ApiPath<RecordId>,
) -> Result<Json<Record<AgencyPaymentMethod>>, ServiceError> {
    service
        .primary_for(agency_id)?
        .map(Json)
        .ok_or_else(|| {
            ServiceError::Absent(format!(
                "agency {agency_id} has no primary payment method"
            ))
        })
}
