use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use sdg_worker::{api, app::ComponentRegistry, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Abort on panic in any task rather than limping along half-broken.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        error!("panic encountered, aborting");
        std::process::abort();
    }));

    let config = Config::from_env().context("failed to load configuration")?;
    let registry = ComponentRegistry::build(config).map(std::sync::Arc::new)?;

    info!(
        bind = %registry.config().http_bind(),
        inference_base_url = registry.config().inference_base_url(),
        vocab_path = %registry.config().vocab_path().display(),
        batch_size = registry.config().batch_size().get(),
        scorer_max_concurrency = registry.config().scorer_max_concurrency().get(),
        chunk_max_words = registry.config().chunk_max_words(),
        chunk_min_letters = registry.config().chunk_min_letters(),
        smoothing_window = registry.config().smoothing_window().get(),
        confidence_level = registry.config().confidence_level(),
        "starting sdg-worker"
    );

    let listener = TcpListener::bind(registry.config().http_bind())
        .await
        .context("failed to bind HTTP listener")?;
    let router = api::build_router(registry);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("sdg-worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(error = %error, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => error!(error = %error, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
