use std::sync::Arc;

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use tokio_util::task::LocalPoolHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ogp_embed::config::Config;
use ogp_embed::ogp::{CacheFront, MemoryStore, OgpFetcher};
use ogp_embed::state::AppState;

#[tokio::main]
async fn main() {
    // JSON logs in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ogp_embed=info,tower_http=info"));

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("OGP embed server starting...");

    let config = Config::from_env();
    info!(
        fetch_timeout = ?config.fetch_timeout,
        cache_ttl = ?config.cache_ttl,
        extract_workers = config.extract_workers,
        "Configuration loaded"
    );

    let fetcher = OgpFetcher::new(config.fetch_timeout).expect("Failed to build HTTP client");
    let ogp = CacheFront::new(fetcher, Arc::new(MemoryStore::new()), config.cache_ttl);

    let app_state = AppState {
        ogp: Arc::new(ogp),
        extract_pool: LocalPoolHandle::new(config.extract_workers),
    };

    // CORS: permissive in dev, restrictive in production.
    let cors = if config.is_dev {
        info!("CORS: permissive (dev mode)");
        CorsLayer::permissive()
    } else {
        info!("CORS: restrictive (production mode)");
        CorsLayer::new()
    };

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = ogp_embed::routes(app_state)
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.server_addr();
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
