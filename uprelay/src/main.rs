use clap::Parser;

use uprelay::config::{Args, Config};
use uprelay::telemetry::init_telemetry;
use uprelay::Application;

/// Resolves on Ctrl+C or SIGTERM so in-flight uploads can finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args)?;

    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    init_telemetry()?;
    tracing::debug!("Loaded configuration from {}", args.config);

    Application::new(config)?.serve(shutdown_signal()).await
}
