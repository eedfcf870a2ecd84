use analytics::{InsightGenerator, KpiSimulator};
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use configuration::{ServerSettings, Settings};
use datastore::CsvRepository;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Debug, Clone)]
pub struct AppState {
    pub repository: CsvRepository,
    pub simulator: KpiSimulator,
    pub insights: InsightGenerator,
    pub preview_rows: usize,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Self {
        let insights = InsightGenerator::new(
            settings.insights.currency_symbol.clone(),
            settings.insights.churn_alert_threshold_pct,
        );
        Self {
            repository: CsvRepository::new(settings.data.clone()),
            simulator: KpiSimulator::new(insights.clone()),
            insights,
            preview_rows: settings.data.preview_rows,
        }
    }
}

/// Builds the application router with CORS, request tracing and the body limit.
pub fn build_router(state: Arc<AppState>, server: &ServerSettings) -> anyhow::Result<Router> {
    let origins = server
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin '{}'", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    // --- DEFINE THE APPLICATION ROUTES ---
    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/favicon.ico", get(handlers::favicon))
        .route("/kpis", get(handlers::get_kpis))
        .route("/monthly-mrr", get(handlers::get_monthly_mrr))
        .route("/insights", get(handlers::get_insights))
        .route("/subscriptions", get(handlers::get_subscriptions))
        .route("/simulate", post(handlers::simulate))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(server.body_limit_bytes));

    Ok(app)
}

/// The main function to configure and run the web server.
///
/// Tracing is initialised by the caller; this only builds the state and serves
/// until Ctrl+C or SIGTERM.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_settings(&settings));
    let app = build_router(state, &settings.server)?;

    let addr = settings.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        data_dir = %settings.data.directory.display(),
        "Web server started and listening."
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received.");
}
