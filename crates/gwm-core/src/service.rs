//! Gateway service - validation in front of a GatewayStore
//!
//! Handlers never talk to a store directly; every write goes through
//! [`GatewayService`] so the validation rules in [`crate::validation`] run
//! before anything is persisted.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{GatewayError, GatewayResult};
use crate::models::{Device, DeviceDraft, Gateway, GatewayDraft, GatewayPatch};
use crate::store::GatewayStore;
use crate::validation::{self, MAX_DEVICES_PER_GATEWAY};

#[derive(Clone)]
pub struct GatewayService {
    store: Arc<dyn GatewayStore>,
}

impl GatewayService {
    pub fn new(store: Arc<dyn GatewayStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn GatewayStore> {
        &self.store
    }

    pub async fn list_gateways(&self) -> GatewayResult<Vec<Gateway>> {
        self.store.list().await
    }

    pub async fn get_gateway(&self, serial: &str) -> GatewayResult<Gateway> {
        self.store
            .get(serial)
            .await?
            .ok_or_else(|| GatewayError::GatewayNotFound(serial.to_string()))
    }

    pub async fn create_gateway(&self, draft: &GatewayDraft) -> GatewayResult<Gateway> {
        let gateway = validation::validate_gateway(draft, Utc::now())?;
        let gateway = self.store.insert(gateway).await?;

        tracing::info!(
            serial = %gateway.serial_number,
            devices = gateway.devices.len(),
            "Gateway created"
        );
        Ok(gateway)
    }

    /// Apply a partial update. An unknown serial is reported as not found
    /// before the body is looked at.
    pub async fn update_gateway(
        &self,
        serial: &str,
        patch: &GatewayPatch,
    ) -> GatewayResult<Gateway> {
        let current = self.get_gateway(serial).await?;

        let changes = validation::validate_changes(patch, Utc::now())?;
        if changes.is_empty() {
            return Ok(current);
        }

        let updated = self
            .store
            .update(serial, changes)
            .await?
            .ok_or_else(|| GatewayError::GatewayNotFound(serial.to_string()))?;

        tracing::info!(serial = %serial, new_serial = %updated.serial_number, "Gateway updated");
        Ok(updated)
    }

    pub async fn delete_gateway(&self, serial: &str) -> GatewayResult<Gateway> {
        let removed = self
            .store
            .delete(serial)
            .await?
            .ok_or_else(|| GatewayError::GatewayNotFound(serial.to_string()))?;

        tracing::info!(serial = %serial, "Gateway deleted");
        Ok(removed)
    }

    /// Validate a device and append it to the gateway.
    ///
    /// The limit and uid checks are enforced by the store in the same
    /// operation as the append, so concurrent adds cannot overfill a gateway.
    pub async fn add_device(&self, serial: &str, draft: &DeviceDraft) -> GatewayResult<Device> {
        self.get_gateway(serial).await?;

        let device = validation::validate_device(draft, Utc::now())?;
        let device = self
            .store
            .push_device(serial, device, MAX_DEVICES_PER_GATEWAY)
            .await?;

        tracing::info!(serial = %serial, uid = device.uid, "Device added");
        Ok(device)
    }

    /// Remove a device by the uid given as a path segment
    pub async fn remove_device(&self, serial: &str, raw_uid: &str) -> GatewayResult<Device> {
        self.get_gateway(serial).await?;

        let uid = validation::parse_uid(raw_uid)?;
        let device = self.store.pull_device(serial, uid).await?;

        tracing::info!(serial = %serial, uid = uid, "Device removed");
        Ok(device)
    }

    /// Insert gateways that are not already present. Returns how many were
    /// inserted.
    pub async fn seed(&self, drafts: &[GatewayDraft]) -> GatewayResult<usize> {
        let mut inserted = 0;
        for draft in drafts {
            let gateway = validation::validate_gateway(draft, Utc::now())?;
            if self.store.get(&gateway.serial_number).await?.is_some() {
                tracing::debug!(serial = %gateway.serial_number, "Seed gateway already present");
                continue;
            }
            self.store.insert(gateway).await?;
            inserted += 1;
        }
        Ok(inserted)
    }
}
