use axum::{http::Request, routing::get};
use axum_prometheus::PrometheusMetricLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use calsocial_share::config::Config;
use calsocial_share::router;
use calsocial_share::state::AppState;

#[tokio::main]
async fn main() {
    // JSON logs in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "calsocial_share=info,tower_http=info"
            .parse()
            .unwrap()
    });

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 calsocial share server starting...");

    let config = Config::from_env().expect("Failed to load configuration");
    info!(
        api = %config.api_base_url,
        public = %config.public_base_url,
        timeout_ms = config.fetch_timeout.as_millis() as u64,
        "📝 Configuration loaded"
    );

    let addr = config.server_addr();
    let app_state = AppState::new(config).expect("Failed to build preview client");

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = router(app_state)
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(prometheus_layer)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        );

    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
