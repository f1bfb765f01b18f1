use chrono::NaiveDate;
use distribution_hub::config::AppConfig;
use distribution_hub::{Hub, HubSettings};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory hub sized by the configured paging and renewal settings.
pub(crate) fn build_hub(config: &AppConfig) -> Hub {
    Hub::in_memory(HubSettings::from(&config.records))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_the_bad_input() {
        assert_eq!(
            parse_date(" 2025-02-28 "),
            Ok(NaiveDate::from_ymd_opt(2025, 2, 28).expect("valid"))
        );
        let err = parse_date("28/02/2025").expect_err("wrong format");
        assert!(err.contains("'28/02/2025'"));
    }
}
