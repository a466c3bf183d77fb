use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use crate::config::Config;
use crate::http::connection::Connection;

/// A bound listener plus the configuration its connections run with.
///
/// Connections are served one after another unless `server.concurrent` is
/// set, in which case each gets its own task.
pub struct Server {
    listener: TcpListener,
    config: Arc<Config>,
}

impl Server {
    pub async fn bind(cfg: Config) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&cfg.server.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", cfg.server.listen_addr))?;
        info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            config: Arc::new(cfg),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until an accept fails.
    pub async fn run(self) -> anyhow::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serves until `shutdown` resolves. A connection in progress when that
    /// happens is dropped.
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let (socket, peer) = tokio::select! {
                res = self.listener.accept() => res?,
                _ = &mut shutdown => break,
            };
            info!("Accepted connection from {}", peer);

            if self.config.server.concurrent {
                let cfg = Arc::clone(&self.config);
                tokio::spawn(async move {
                    serve(socket, peer, &cfg).await;
                });
            } else {
                tokio::select! {
                    _ = serve(socket, peer, &self.config) => {}
                    _ = &mut shutdown => break,
                }
            }
        }

        info!("Listener stopped");
        Ok(())
    }
}

async fn serve(socket: TcpStream, peer: SocketAddr, cfg: &Config) {
    let mut conn = Connection::new(socket, cfg);
    match conn.run().await {
        Ok(outcome) => debug!(%peer, ?outcome, "Connection finished"),
        Err(e) => tracing::error!("Connection error from {}: {}", peer, e),
    }
}
