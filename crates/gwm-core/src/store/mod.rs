//! GatewayStore trait - the persistence abstraction behind the service
//!
//! Implementations must make `push_device` and `pull_device` atomic with
//! respect to the owning gateway document: the limit/uid checks and the
//! append (or removal) happen as one store operation, never as a separate
//! read followed by a write.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::models::{Device, Gateway, GatewayChanges};

/// Persistent storage for gateway documents, keyed by serial number
#[async_trait]
pub trait GatewayStore: Send + Sync {
    /// Short backend name for logs ("memory", "mongodb")
    fn kind(&self) -> &'static str;

    /// Check that the store is reachable
    async fn ping(&self) -> GatewayResult<()> {
        Ok(())
    }

    /// All gateways, in insertion order
    async fn list(&self) -> GatewayResult<Vec<Gateway>>;

    async fn get(&self, serial: &str) -> GatewayResult<Option<Gateway>>;

    /// Persist a new gateway. Fails with a validation error on `serialNumber`
    /// if the serial number is taken.
    async fn insert(&self, gateway: Gateway) -> GatewayResult<Gateway>;

    /// Apply a validated change set; `None` when no gateway matches
    async fn update(&self, serial: &str, changes: GatewayChanges)
        -> GatewayResult<Option<Gateway>>;

    /// Remove a gateway, returning what was removed
    async fn delete(&self, serial: &str) -> GatewayResult<Option<Gateway>>;

    /// Append a device if the gateway has fewer than `limit` devices and no
    /// device with the same uid.
    ///
    /// Errors: `GatewayNotFound`, or a validation error for the limit/uid.
    async fn push_device(&self, serial: &str, device: Device, limit: usize)
        -> GatewayResult<Device>;

    /// Remove the device with `uid`, returning it.
    ///
    /// Errors: `GatewayNotFound` or `DeviceNotFound`.
    async fn pull_device(&self, serial: &str, uid: i64) -> GatewayResult<Device>;
}
