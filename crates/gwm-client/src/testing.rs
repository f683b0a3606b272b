//! In-process server for integration tests
//!
//! [`TestServer`] serves a router on an ephemeral loopback port and hands out
//! a [`GatewayClient`] pointed at it. Dropping the server stops it.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::{GatewayClient, Result};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);
const CLIENT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: GatewayClient,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Bind `router` to `127.0.0.1:0` and start serving it
    pub async fn start(router: Router) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (stop, stopped) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async {
                stopped.await.ok();
            });
            if let Err(e) = serve.await {
                tracing::warn!("Test server exited with error: {}", e);
            }
        });

        let client = GatewayClient::with_config(
            &format!("http://{}", addr),
            CLIENT_TIMEOUT,
            CLIENT_CONNECT_TIMEOUT,
        )?;

        Ok(Self {
            addr,
            client,
            stop: Some(stop),
            task: Some(task),
        })
    }

    /// Absolute URL for a server path such as `/gateways`
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(mut self) {
        if let Some(task) = self.signal_stop() {
            task.await.ok();
        }
    }

    fn signal_stop(&mut self) -> Option<JoinHandle<()>> {
        if let Some(stop) = self.stop.take() {
            stop.send(()).ok();
        }
        self.task.take()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(task) = self.signal_stop() {
            task.abort();
        }
    }
}
