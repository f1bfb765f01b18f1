use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Months, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::document::{DocumentStatus, TermsDocument};
use super::renewal::{RenewalFailure, RenewalOutcome, RenewalPolicy};
use super::schema::{validate_variables, VariableReport};
use super::substitution::{merge_values, render};
use super::template::TermsTemplate;
use crate::partners::Distributor;
use crate::records::{
    CrudService, Entity, Lifecycle, Record, RecordId, ServiceError, Violations,
};

/// Variables the engine fills in from the distributor and the document itself.
pub const DERIVED_VARIABLES: [&str; 12] = [
    "distributor_name",
    "distributor_display_name",
    "distributor_tax_id",
    "distributor_registration_number",
    "distributor_email",
    "distributor_phone",
    "distributor_website",
    "distributor_address",
    "current_date",
    "effective_date",
    "expiration_date",
    "document_version",
];

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub template_id: RecordId,
    pub distributor_id: RecordId,
    #[serde(default)]
    pub variables: Map<String, Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error)]
pub enum TermsError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("terms template {0} is inactive")]
    TemplateInactive(RecordId),
    #[error("terms template {0} must be approved before use")]
    TemplateNotApproved(RecordId),
    #[error("template variables are invalid: {0}")]
    InvalidVariables(VariableReport),
}

/// Generates, signs, and renews terms documents from stored templates.
pub struct TermsService {
    templates: Arc<CrudService<TermsTemplate>>,
    documents: Arc<CrudService<TermsDocument>>,
    distributors: Arc<CrudService<Distributor>>,
    policy: RenewalPolicy,
}

impl TermsService {
    pub fn new(
        templates: Arc<CrudService<TermsTemplate>>,
        documents: Arc<CrudService<TermsDocument>>,
        distributors: Arc<CrudService<Distributor>>,
        policy: RenewalPolicy,
    ) -> Self {
        Self {
            templates,
            documents,
            distributors,
            policy,
        }
    }

    pub fn templates(&self) -> &Arc<CrudService<TermsTemplate>> {
        &self.templates
    }

    pub fn documents(&self) -> &Arc<CrudService<TermsDocument>> {
        &self.documents
    }

    /// Checks `variables` against a stored template's schema.
    pub fn validate(
        &self,
        template_id: RecordId,
        variables: &Map<String, Value>,
    ) -> Result<VariableReport, TermsError> {
        let template = self.templates.get(template_id)?;
        Ok(validate_variables(&template.data.variables, variables))
    }

    /// Renders the document `generate` would persist, without persisting it.
    pub fn preview(
        &self,
        request: &GenerationRequest,
        today: NaiveDate,
    ) -> Result<TermsDocument, TermsError> {
        let template = self.templates.get(request.template_id)?;
        let distributor = self.distributors.get(request.distributor_id)?;
        self.compose(&template, &distributor, request, today)
    }

    pub fn generate(
        &self,
        request: &GenerationRequest,
        today: NaiveDate,
    ) -> Result<Record<TermsDocument>, TermsError> {
        let document = self.preview(request, today)?;
        let record = self.documents.create(document)?;
        info!(
            id = %record.id,
            template_id = %record.data.template_id,
            distributor_id = %record.data.distributor_id,
            document_version = record.data.document_version,
            unresolved = record.data.unresolved_placeholders.len(),
            "terms document generated"
        );
        Ok(record)
    }

    pub fn sign(
        &self,
        id: RecordId,
        signed_by: &str,
    ) -> Result<Record<TermsDocument>, TermsError> {
        let mut violations = Violations::new(TermsDocument::KIND);
        violations.require("signed_by", signed_by);
        violations.finish().map_err(ServiceError::from)?;

        let record = self.documents.modify(id, |document| {
            let current = document.status;
            if !TermsDocument::can_transition(current, DocumentStatus::Signed) {
                return Err(ServiceError::InvalidTransition {
                    kind: TermsDocument::KIND,
                    from: current.to_string(),
                    to: DocumentStatus::Signed.to_string(),
                });
            }
            document.signed_by = Some(signed_by.trim().to_string());
            document.apply_status(DocumentStatus::Signed, Utc::now());
            Ok(true)
        })?;
        info!(%id, signed_by, "terms document signed");
        Ok(record)
    }

    pub fn terminate(&self, id: RecordId) -> Result<Record<TermsDocument>, TermsError> {
        Ok(self.documents.transition(id, DocumentStatus::Terminated)?)
    }

    /// Newest signed document in force for the distributor on `today`.
    pub fn active_for(
        &self,
        distributor_id: RecordId,
        today: NaiveDate,
    ) -> Result<Option<Record<TermsDocument>>, TermsError> {
        self.distributors.get(distributor_id)?;
        Ok(self
            .documents
            .find(|document| {
                document.distributor_id == distributor_id && document.in_force_on(today)
            })?
            .into_iter()
            .max_by_key(|record| (record.data.effective_date, record.created_at)))
    }

    /// Renews due documents and expires lapsed ones, optionally for one distributor.
    pub fn run_renewals(
        &self,
        distributor_id: Option<RecordId>,
        today: NaiveDate,
    ) -> Result<RenewalOutcome, TermsError> {
        let signed = self.documents.find(|document| {
            document.status == DocumentStatus::Signed
                && distributor_id.map_or(true, |id| document.distributor_id == id)
        })?;
        let succeeded: HashSet<RecordId> = self
            .documents
            .find(|document| document.previous_document_id.is_some())?
            .into_iter()
            .filter_map(|record| record.data.previous_document_id)
            .collect();

        let mut outcome = RenewalOutcome::default();
        for record in signed {
            let id = record.id;
            if self.policy.is_lapsed(&record.data, today) {
                match self.documents.transition(id, DocumentStatus::Expired) {
                    Ok(_) => outcome.expired.push(id),
                    Err(error) => outcome.failures.push(failure(id, &error)),
                }
                continue;
            }
            if !self.policy.is_due(&record.data, today) || succeeded.contains(&id) {
                continue;
            }

            match self.renew(&record, today) {
                Ok(Some(renewal)) => {
                    info!(previous = %id, id = %renewal.id, "terms document renewed");
                    outcome.renewed.push(renewal.id);
                }
                Ok(None) => {}
                Err(error) => outcome.failures.push(failure(id, &error)),
            }
        }

        info!(
            renewed = outcome.renewed.len(),
            expired = outcome.expired.len(),
            failed = outcome.failures.len(),
            "terms renewal run finished"
        );
        Ok(outcome)
    }

    /// Regenerates `previous` for its next term. `None` when its template does not auto-renew.
    fn renew(
        &self,
        previous: &Record<TermsDocument>,
        today: NaiveDate,
    ) -> Result<Option<Record<TermsDocument>>, TermsError> {
        let template = self.templates.get(previous.data.template_id)?;
        if !template.data.auto_renewal {
            return Ok(None);
        }
        let distributor = self.distributors.get(previous.data.distributor_id)?;
        let Some((effective, expiration)) =
            self.policy.rolled_forward(&previous.data, &template.data)
        else {
            return Ok(None);
        };

        let mut variables = previous.data.variables.clone();
        for name in DERIVED_VARIABLES {
            variables.remove(name);
        }
        let request = GenerationRequest {
            template_id: previous.data.template_id,
            distributor_id: previous.data.distributor_id,
            variables,
            title: Some(previous.data.title.clone()),
            effective_date: Some(effective),
            expiration_date: Some(expiration),
        };

        let mut document = self.compose(&template, &distributor, &request, today)?;
        document.previous_document_id = Some(previous.id);
        document.signed_by = previous.data.signed_by.clone();
        document.apply_status(DocumentStatus::Signed, Utc::now());
        Ok(Some(self.documents.create(document)?))
    }

    fn compose(
        &self,
        template: &Record<TermsTemplate>,
        distributor: &Record<Distributor>,
        request: &GenerationRequest,
        today: NaiveDate,
    ) -> Result<TermsDocument, TermsError> {
        if !template.data.is_active {
            return Err(TermsError::TemplateInactive(template.id));
        }
        if !template.data.is_approved() {
            return Err(TermsError::TemplateNotApproved(template.id));
        }

        let effective = request.effective_date.unwrap_or(today);
        let expiration = request.expiration_date.or_else(|| {
            template
                .data
                .renewal_period_months
                .and_then(|months| effective.checked_add_months(Months::new(months)))
        });
        let document_version = self.next_version(distributor.id, template.id)?;

        let derived = derived_values(
            &distributor.data,
            today,
            effective,
            expiration,
            document_version,
        );
        let values = merge_values(&template.data.variables, &derived, &request.variables);
        let report = validate_variables(&template.data.variables, &values);
        if !report.is_valid() {
            warn!(template_id = %template.id, %report, "terms variables rejected");
            return Err(TermsError::InvalidVariables(report));
        }

        let rendered = render(&template.data.content, &values);
        let title = request
            .title
            .clone()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| template.data.name.clone());

        let document = TermsDocument {
            distributor_id: distributor.id,
            template_id: template.id,
            title,
            content: rendered.content,
            variables: values,
            unresolved_placeholders: rendered.unresolved,
            document_version,
            status: DocumentStatus::Draft,
            effective_date: Some(effective),
            expiration_date: expiration,
            signed_at: None,
            signed_by: None,
            previous_document_id: None,
            terminated_at: None,
        };
        document.validate().map_err(ServiceError::from)?;
        Ok(document)
    }

    fn next_version(
        &self,
        distributor_id: RecordId,
        template_id: RecordId,
    ) -> Result<u32, ServiceError> {
        let highest = self
            .documents
            .find(|document| {
                document.distributor_id == distributor_id && document.template_id == template_id
            })?
            .into_iter()
            .map(|record| record.data.document_version)
            .max()
            .unwrap_or(0);
        Ok(highest.saturating_add(1))
    }
}

fn failure(document_id: RecordId, error: &dyn std::fmt::Display) -> RenewalFailure {
    let reason = error.to_string();
    warn!(%document_id, %reason, "terms renewal failed");
    RenewalFailure {
        document_id,
        reason,
    }
}

/// Values taken from the distributor and the document being produced. Absent
/// distributor fields are null so schema defaults still apply.
pub fn derived_values(
    distributor: &Distributor,
    today: NaiveDate,
    effective: NaiveDate,
    expiration: Option<NaiveDate>,
    document_version: u32,
) -> Map<String, Value> {
    let date = |day: NaiveDate| Value::String(day.format("%Y-%m-%d").to_string());
    let text = |field: &Option<String>| field.clone().map_or(Value::Null, Value::String);

    let mut values = Map::new();
    values.insert("distributor_name".into(), json!(distributor.name));
    values.insert(
        "distributor_display_name".into(),
        json!(distributor.presented_name()),
    );
    values.insert("distributor_tax_id".into(), text(&distributor.tax_id));
    values.insert(
        "distributor_registration_number".into(),
        text(&distributor.registration_number),
    );
    values.insert("distributor_email".into(), text(&distributor.email));
    values.insert("distributor_phone".into(), text(&distributor.phone));
    values.insert("distributor_website".into(), text(&distributor.website));
    values.insert("distributor_address".into(), text(&distributor.address));
    values.insert("current_date".into(), date(today));
    values.insert("effective_date".into(), date(effective));
    values.insert(
        "expiration_date".into(),
        expiration.map_or(Value::Null, date),
    );
    values.insert("document_version".into(), json!(document_version));
    values
}
