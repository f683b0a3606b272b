//! Gateway manager client library
//!
//! Provides a typed HTTP client for the gateway manager API.
//!
//! # Example
//!
//! ```rust,no_run
//! use gwm_client::{DeviceDraft, DeviceStatus, GatewayClient, GatewayDraft};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gwm_client::ClientError> {
//!     let client = GatewayClient::new("http://localhost:3000")?;
//!
//!     client
//!         .create_gateway(&GatewayDraft::new("S1", "Lobby", "10.0.0.1"))
//!         .await?;
//!     client
//!         .add_device("S1", &DeviceDraft::new(1, "ACME", DeviceStatus::Online))
//!         .await?;
//!
//!     let gateway = client.get_gateway("S1").await?;
//!     println!("{} has {} devices", gateway.name, gateway.devices.len());
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module runs a router on an ephemeral port:
//!
//! ```rust,ignore
//! use gwm_client::testing::TestServer;
//! use gwm_api::{create_router, AppState};
//!
//! let server = TestServer::start(create_router(state)).await?;
//! let gateways = server.client.list_gateways().await?;
//! ```

mod client;
mod error;
pub mod testing;

pub use client::GatewayClient;
pub use error::{ClientError, Result};

// Re-export core types for convenience
pub use gwm_core::models::{Device, DeviceDraft, DeviceStatus, Gateway, GatewayDraft, GatewayPatch};
