use std::{sync::LazyLock, time::Duration};

use missive_common::{Signal, internal, tracing};
use missive_delivery::DeliveryConfig;
use missive_server::{AppState, ContactServer, ServerConfig, ServerError};
use serde::Deserialize;
use tokio::{sync::broadcast, task::JoinHandle};

/// How long in-flight requests get to finish after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Top-level configuration, as read from `missive.config.ron`
#[derive(Debug, Default, Deserialize)]
pub struct Missive {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

pub static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(64);
    sender
});

async fn terminate() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            r = tokio::signal::ctrl_c() => {
                r?;
                internal!(level = INFO, "CTRL+C entered -- Enter it again to force shutdown");
            }
            _ = terminate.recv() => {
                internal!(level = INFO, "Terminate Signal received, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        internal!(level = INFO, "CTRL+C entered -- Enter it again to force shutdown");
    }

    Ok(())
}

/// Wait for the server to drain, unless forced or out of time
async fn drain(server: JoinHandle<Result<(), ServerError>>) -> anyhow::Result<()> {
    tokio::select! {
        r = tokio::time::timeout(SHUTDOWN_GRACE, server) => match r {
            Ok(joined) => joined?.map_err(anyhow::Error::from),
            Err(_) => {
                tracing::warn!(grace = ?SHUTDOWN_GRACE, "Server did not stop in time");
                Ok(())
            }
        },
        _ = tokio::signal::ctrl_c() => {
            internal!(level = WARN, "Forced shutdown");
            Ok(())
        }
    }
}

impl Missive {
    /// Run the contact server until a shutdown signal arrives
    ///
    /// Logging is expected to be initialised already, so that warnings
    /// raised while loading the configuration are not lost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the listener cannot be bound,
    /// a transport cannot be constructed, or the server fails.
    pub async fn run(self) -> anyhow::Result<()> {
        internal!(level = INFO, "Controller running");

        if self.delivery.to_address().is_none() || self.delivery.from_address().is_none() {
            tracing::warn!(
                "FROM_EMAIL or TO_EMAIL is not configured; submissions will be answered with 500"
            );
        }

        let state = AppState::from_config(&self.server, &self.delivery)?;
        let server = ContactServer::new(&self.server.listen_address, state.into()).await?;
        let mut serving = tokio::spawn(server.serve(SHUTDOWN_BROADCAST.subscribe()));

        let stopped = tokio::select! {
            r = &mut serving => Some(r),
            r = terminate() => {
                r?;
                None
            }
        };

        let ret = match stopped {
            Some(joined) => joined
                .map_err(anyhow::Error::from)
                .and_then(|r| r.map_err(anyhow::Error::from)),
            None => {
                SHUTDOWN_BROADCAST
                    .send(Signal::Shutdown)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;
                drain(serving).await
            }
        };

        internal!(level = INFO, "Shutting down...");

        ret
    }
}
