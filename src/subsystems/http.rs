use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use bon::Builder;
use tokio::net::TcpListener;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::info;

#[derive(Builder)]
pub struct HttpSubsystem {
    pub(crate) bind: SocketAddr,
    pub(crate) router: Router,
}

impl HttpSubsystem {
    pub async fn run(self, subsys: SubsystemHandle) -> anyhow::Result<()> {
        info!("Starting HTTP subsystem");

        let listener = TcpListener::bind(self.bind)
            .await
            .with_context(|| format!("failed to bind {}", self.bind))?;
        info!(addr = %listener.local_addr()?, "http server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { subsys.on_shutdown_requested().await })
            .await
            .context("http server error")?;

        info!("HTTP subsystem finished");
        Ok(())
    }
}
