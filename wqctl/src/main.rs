use clap::Parser;
use tracing::{info, warn};
use wqctl::{
    Application, Config,
    config::{Args, StorageConfig},
    telemetry,
};

/// Which signal asked the service to stop.
#[derive(Debug, Clone, Copy)]
enum StopReason {
    Interrupt,
    Terminate,
}

async fn interrupt() -> std::io::Result<StopReason> {
    tokio::signal::ctrl_c().await?;
    Ok(StopReason::Interrupt)
}

#[cfg(unix)]
async fn terminate() -> std::io::Result<StopReason> {
    use tokio::signal::unix::{SignalKind, signal};

    signal(SignalKind::terminate())?.recv().await;
    Ok(StopReason::Terminate)
}

#[cfg(not(unix))]
async fn terminate() -> std::io::Result<StopReason> {
    std::future::pending().await
}

/// Resolves once the process is asked to stop. A handler that cannot be installed is logged
/// and the other one keeps listening.
async fn stop_requested() {
    let reason = tokio::select! {
        Ok(reason) = interrupt() => reason,
        Ok(reason) = terminate() => reason,
        else => {
            warn!("No stop signal handler could be installed; serving until killed");
            std::future::pending().await
        }
    };
    info!(?reason, "Stop requested, draining in-flight quality requests");
}

fn storage_label(storage: &StorageConfig) -> &'static str {
    match storage {
        StorageConfig::Memory => "in-memory",
        StorageConfig::Postgres { .. } => "postgres",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!(
            "{}: ok ({} storage, identity service at {})",
            args.config,
            storage_label(&config.storage),
            config.identity.base_url
        );
        return Ok(());
    }

    telemetry::init_telemetry(config.enable_otel_export)?;
    info!(
        storage = storage_label(&config.storage),
        identity = %config.identity.base_url,
        "Starting wqctl"
    );

    Application::new(config).await?.serve(stop_requested()).await
}
