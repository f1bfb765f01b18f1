use crate::cli::ServeArgs;
use crate::infra::{build_hub, AppState};
use crate::routes::with_operational_routes;
use crate::seed::seed_demo;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use distribution_hub::config::AppConfig;
use distribution_hub::error::AppError;
use distribution_hub::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let hub = build_hub(&config);
    if args.seed_demo {
        let seeded = seed_demo(&hub)?;
        info!(
            distributor_id = %seeded.distributor_id,
            template_id = %seeded.template_id,
            "demo records loaded"
        );
    }

    let app = with_operational_routes(hub.router())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "distribution hub ready");

    axum::serve(listener, app).await?;
    Ok(())
}
