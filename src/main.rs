use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use livecount::{api, config::AppConfig, recorder, state::AppState, ws};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "livecount=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting livecount...");

    let config = AppConfig::from_env();
    let recorder = recorder::Recorder::from_config(&config);
    let state = Arc::new(AppState::new(recorder));

    tracing::info!(
        "Recording to {} every {:?}",
        config.record_dir.display(),
        config.record_interval
    );
    recorder::spawn_interval_recorder(state.clone(), config.record_interval);

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .merge(api::routes())
        .fallback_service(
            // Client-side routes fall back to the app shell
            ServeDir::new(&config.static_dir)
                .fallback(ServeFile::new(config.static_dir.join("index.html"))),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
