use crate::cli::ServeArgs;
use crate::infra::{default_match_config, AppState, OfferBoard};
use crate::routes::with_quick_search_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use quickstaff::config::AppConfig;
use quickstaff::error::AppError;
use quickstaff::telemetry;
use quickstaff::workflows::quicksearch::OfferDispatchService;
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
    let board = Arc::new(OfferBoard::default());
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        board: board.clone(),
    };

    let dispatch_service = Arc::new(OfferDispatchService::new(
        board,
        default_match_config(&config),
    ));

    let app = with_quick_search_routes(dispatch_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "quick search dispatch service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
