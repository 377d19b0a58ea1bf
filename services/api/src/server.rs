use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use essay_coach::config::AppConfig;
use essay_coach::error::AppError;
use essay_coach::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config, args);

    telemetry::init(&config.telemetry)?;

    if config.generative.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; every submission will return the fallback report");
    }
    if config.access.tokens.is_empty() {
        info!("no access tokens configured; submissions are open");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let ready = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: Arc::clone(&ready),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(build_service(&config)?);
    let app = with_service_routes(service)
        .layer(Extension(state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ready.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        debounce_ms = config.realtime.debounce().as_millis() as u64,
        "essay evaluation service ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(ready))
        .await?;
    info!("essay evaluation service stopped");
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}

/// Resolves on Ctrl-C, flipping readiness off before in-flight requests drain.
async fn shutdown_signal(ready: Arc<AtomicBool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    ready.store(false, Ordering::Release);
    info!("shutdown requested");
}
