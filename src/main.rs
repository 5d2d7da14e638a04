use std::time::Duration;

use dotenvy::dotenv;
use tracing::{info, warn};

use stockbay::config::runtime::RuntimeMode;
use stockbay::logging::init_tracing;
use stockbay::router::init_router;
use stockbay::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let runtime = RuntimeMode::from_env();
    init_tracing(runtime);

    let state = init_app_state().await;

    if state.jwt_config.secret.is_none() {
        warn!("JWT_SECRET is not set; every authenticated request will be rejected");
    }

    state
        .cache
        .start_sweeper(Duration::from_secs(
            state.cache_config.sweep_interval_seconds,
        ))
        .await;

    let app = init_router(state.clone());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind server port");

    info!(port = %port, "StockBay API listening");
    info!("Swagger UI at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    state.cache.stop_sweeper().await;
    info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
