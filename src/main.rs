use habit_tracker::{load_config, resolve_settings_path, router, AppState, HabitTracker, SheetClient};
use std::{env, net::SocketAddr, time::Duration};
use tokio::fs;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let settings_path = resolve_settings_path();
    if let Some(parent) = settings_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let config = load_config(&settings_path).await;
    info!(
        configured = config.is_configured(),
        path = %settings_path.display(),
        "loaded endpoint settings"
    );

    let timeout_secs = env::var("HABIT_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(10);
    let remote = SheetClient::new(Duration::from_secs(timeout_secs))?;

    let state = AppState::new(HabitTracker::new(remote, config, settings_path));

    let tracker = state.tracker.clone();
    tokio::spawn(async move {
        if let Err(err) = tracker.load().await {
            error!("initial load failed: {err}");
        }
    });

    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
