//! When signed terms roll over, and what the next term looks like.

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;

use super::document::{DocumentStatus, TermsDocument};
use super::template::TermsTemplate;
use crate::records::RecordId;

const FALLBACK_PERIOD_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    pub window_days: u32,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self { window_days: 30 }
    }
}

impl RenewalPolicy {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    /// Signed with an expiration inside `today..=today + window`.
    pub fn is_due(&self, document: &TermsDocument, today: NaiveDate) -> bool {
        let Some(expiration) = document.expiration_date else {
            return false;
        };
        let horizon = today
            .checked_add_days(Days::new(u64::from(self.window_days)))
            .unwrap_or(NaiveDate::MAX);
        document.status == DocumentStatus::Signed && today <= expiration && expiration <= horizon
    }

    /// Signed but already past its expiration on `today`.
    pub fn is_lapsed(&self, document: &TermsDocument, today: NaiveDate) -> bool {
        document.status == DocumentStatus::Signed
            && document
                .expiration_date
                .is_some_and(|expiration| expiration < today)
    }

    /// Effective and expiration dates for the term following `document`.
    ///
    /// The next term starts on the old expiration and keeps the old term length.
    /// Without an old start date, or when the old term was shorter than a day,
    /// the template's renewal period applies instead.
    pub fn rolled_forward(
        &self,
        document: &TermsDocument,
        template: &TermsTemplate,
    ) -> Option<(NaiveDate, NaiveDate)> {
        let start = document.expiration_date?;
        let previous_length = document
            .effective_date
            .map(|previous_start| start - previous_start)
            .filter(|length| length.num_days() >= 1);
        let end = match previous_length {
            Some(length) => start.checked_add_signed(length)?,
            None => start.checked_add_months(Months::new(
                template
                    .renewal_period_months
                    .unwrap_or(FALLBACK_PERIOD_MONTHS),
            ))?,
        };
        Some((start, end))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenewalOutcome {
    pub renewed: Vec<RecordId>,
    pub expired: Vec<RecordId>,
    pub failures: Vec<RenewalFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenewalFailure {
    pub document_id: RecordId,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::schema::VariableSchema;
    use crate::terms::template::TemplateCategory;
    use serde_json::Map;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn signed(effective: Option<NaiveDate>, expiration: Option<NaiveDate>) -> TermsDocument {
        TermsDocument {
            distributor_id: RecordId::new(),
            template_id: RecordId::new(),
            title: "Agreement".to_string(),
            content: String::new(),
            variables: Map::new(),
            unresolved_placeholders: Vec::new(),
            document_version: 1,
            status: DocumentStatus::Signed,
            effective_date: effective,
            expiration_date: expiration,
            signed_at: None,
            signed_by: Some("ops@acme".to_string()),
            previous_document_id: None,
            terminated_at: None,
        }
    }

    fn template(period: Option<u32>) -> TermsTemplate {
        TermsTemplate {
            name: "Agreement".to_string(),
            description: None,
            category: TemplateCategory::Distribution,
            content: "text".to_string(),
            variables: VariableSchema::new(),
            revision: "1.0".to_string(),
            is_active: true,
            is_default: false,
            approval_required: false,
            approved_by: None,
            approved_at: None,
            auto_renewal: true,
            renewal_period_months: period,
        }
    }

    #[test]
    fn window_is_inclusive_at_both_ends() {
        let policy = RenewalPolicy::default();
        let today = day(2025, 6, 1);
        assert!(policy.is_due(&signed(None, Some(today)), today));
        assert!(policy.is_due(&signed(None, Some(day(2025, 7, 1))), today));
        assert!(!policy.is_due(&signed(None, Some(day(2025, 7, 2))), today));
        assert!(!policy.is_due(&signed(None, Some(day(2025, 5, 31))), today));
        assert!(!policy.is_due(&signed(None, None), today));
    }

    #[test]
    fn only_signed_documents_are_due_or_lapsed() {
        let policy = RenewalPolicy::new(10);
        let today = day(2025, 6, 1);
        let mut draft = signed(None, Some(day(2025, 6, 5)));
        draft.status = DocumentStatus::Draft;
        assert!(!policy.is_due(&draft, today));

        draft.expiration_date = Some(day(2025, 5, 1));
        assert!(!policy.is_lapsed(&draft, today));
        assert!(policy.is_lapsed(&signed(None, Some(day(2025, 5, 31))), today));
    }

    #[test]
    fn next_term_keeps_the_previous_length() {
        let policy = RenewalPolicy::default();
        let document = signed(Some(day(2025, 1, 1)), Some(day(2025, 3, 1)));
        assert_eq!(
            policy.rolled_forward(&document, &template(Some(12))),
            Some((day(2025, 3, 1), day(2025, 4, 29)))
        );
    }

    #[test]
    fn zero_length_term_rolls_over_by_template_period() {
        let policy = RenewalPolicy::default();
        let document = signed(Some(day(2025, 6, 20)), Some(day(2025, 6, 20)));
        assert_eq!(
            policy.rolled_forward(&document, &template(Some(3))),
            Some((day(2025, 6, 20), day(2025, 9, 20)))
        );
        assert_eq!(
            policy.rolled_forward(&document, &template(None)),
            Some((day(2025, 6, 20), day(2026, 6, 20)))
        );
    }

    #[test]
    fn next_term_falls_back_to_template_period() {
        let policy = RenewalPolicy::default();
        let document = signed(None, Some(day(2025, 1, 31)));
        assert_eq!(
            policy.rolled_forward(&document, &template(Some(1))),
            Some((day(2025, 1, 31), day(2025, 2, 28)))
        );
        assert_eq!(
            policy.rolled_forward(&document, &template(None)),
            Some((day(2025, 1, 31), day(2026, 1, 31)))
        );
    }
}
