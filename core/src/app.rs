use std::future::Future;

use anyhow::{Context, Result};
use retention_sweeper::Sweeper;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{config::Config, files};

/// Run the service until SIGINT or SIGTERM arrives.
pub async fn run(config: Config) -> Result<()> {
    run_until(config, async {
        match shutdown_signal().await {
            Ok(()) => info!("termination signal received"),
            Err(err) => error!("cannot listen for termination signals: {err}"),
        }
    })
    .await
}

/// Bootstrap the storage root, start the retention sweeper and keep it
/// running until `stop` resolves.
pub async fn run_until<F>(config: Config, stop: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    files::ensure_data_dir(&config.data_dir).await?;
    let shutdown = CancellationToken::new();
    let sweeper = Sweeper::new(config.retention_policy()).spawn(shutdown.clone());
    info!(data_dir = %config.data_dir.display(), "imghost running - press Ctrl+C to exit");

    stop.await;
    shutdown.cancel();
    sweeper.await.context("retention sweeper task failed")?;
    Ok(())
}

/// Resolve once the process is asked to terminate.
pub async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = term.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
