use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crate::partners::{Distributor, DistributorStatus};
use crate::records::{CrudService, InMemoryRepository, PageLimits, Record};
use crate::terms::{
    GenerationRequest, RenewalPolicy, TemplateCategory, TermsDocument, TermsService,
    TermsTemplate, VariableSchema,
};

pub(super) struct Fixture {
    pub(super) service: Arc<TermsService>,
    pub(super) distributors: Arc<CrudService<Distributor>>,
}

pub(super) fn fixture() -> Fixture {
    let limits = PageLimits::default();
    let distributors = Arc::new(CrudService::new(
        Arc::new(InMemoryRepository::<Distributor>::default()),
        limits,
    ));
    let templates = Arc::new(CrudService::new(
        Arc::new(InMemoryRepository::<TermsTemplate>::default()),
        limits,
    ));
    let documents = Arc::new(CrudService::new(
        Arc::new(InMemoryRepository::<TermsDocument>::default()),
        limits,
    ));
    let service = Arc::new(TermsService::new(
        templates,
        documents,
        distributors.clone(),
        RenewalPolicy::default(),
    ));
    Fixture {
        service,
        distributors,
    }
}

pub(super) fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn distributor() -> Distributor {
    Distributor {
        name: "Acme Distribution Ltd".to_string(),
        display_name: Some("Acme".to_string()),
        tax_id: Some("PT509876543".to_string()),
        registration_number: None,
        email: Some("legal@acme.example".to_string()),
        phone: None,
        website: Some("https://acme.example".to_string()),
        address: Some("12 Harbour Road, Porto".to_string()),
        status: DistributorStatus::Active,
    }
}

pub(super) fn schema() -> VariableSchema {
    serde_json::from_value(json!({
        "credit_limit": { "type": "number", "required": true },
        "exclusive": { "type": "boolean", "default": false },
        "jurisdiction": { "type": "string", "required": true, "default": "Portugal" },
        "distributor_phone": { "type": "string", "default": "n/a" }
    }))
    .expect("schema parses")
}

pub(super) fn template() -> TermsTemplate {
    TermsTemplate {
        name: "Distribution agreement".to_string(),
        description: None,
        category: TemplateCategory::Distribution,
        content: "Agreement v{{document_version}} between Example Corp and \
                  {{ distributor_display_name }} ({{distributor_tax_id}}), phone \
                  {{distributor_phone}}. Credit limit {{credit_limit}}, exclusive: \
                  {{exclusive}}, governed by {{jurisdiction}} law from {{effective_date}} \
                  until {{expiration_date}}. {{annex}}"
            .to_string(),
        variables: schema(),
        revision: "1.0".to_string(),
        is_active: true,
        is_default: false,
        approval_required: false,
        approved_by: None,
        approved_at: None,
        auto_renewal: true,
        renewal_period_months: Some(12),
    }
}

pub(super) fn variables(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("object expected"),
    }
}

pub(super) fn seeded(fixture: &Fixture) -> (Record<Distributor>, Record<TermsTemplate>) {
    let distributor = fixture
        .distributors
        .create(distributor())
        .expect("distributor stored");
    let template = fixture
        .service
        .templates()
        .create(template())
        .expect("template stored");
    (distributor, template)
}

pub(super) fn request(
    distributor: &Record<Distributor>,
    template: &Record<TermsTemplate>,
) -> GenerationRequest {
    GenerationRequest {
        template_id: template.id,
        distributor_id: distributor.id,
        variables: variables(json!({ "credit_limit": 25000 })),
        title: None,
        effective_date: Some(day(2025, 1, 1)),
        expiration_date: None,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
