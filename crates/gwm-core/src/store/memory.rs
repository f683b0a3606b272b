//! In-process store used for demo mode and tests

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{GatewayError, GatewayResult};
use crate::models::{Device, Gateway, GatewayChanges};
use crate::store::GatewayStore;
use crate::validation;

/// Gateway store backed by a vector behind a lock.
///
/// Every mutation holds the write lock for its whole check-and-write, which
/// gives the same per-gateway atomicity a document store provides.
#[derive(Debug, Default)]
pub struct MemoryStore {
    gateways: RwLock<Vec<Gateway>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with gateways
    pub fn with_gateways(gateways: Vec<Gateway>) -> Self {
        Self {
            gateways: RwLock::new(gateways),
        }
    }

    pub fn len(&self) -> usize {
        self.gateways.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.read().is_empty()
    }
}

#[async_trait]
impl GatewayStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> GatewayResult<Vec<Gateway>> {
        Ok(self.gateways.read().clone())
    }

    async fn get(&self, serial: &str) -> GatewayResult<Option<Gateway>> {
        Ok(self
            .gateways
            .read()
            .iter()
            .find(|g| g.serial_number == serial)
            .cloned())
    }

    async fn insert(&self, gateway: Gateway) -> GatewayResult<Gateway> {
        let mut gateways = self.gateways.write();
        if gateways
            .iter()
            .any(|g| g.serial_number == gateway.serial_number)
        {
            return Err(validation::duplicate_serial(&gateway.serial_number).into());
        }
        gateways.push(gateway.clone());
        Ok(gateway)
    }

    async fn update(
        &self,
        serial: &str,
        changes: GatewayChanges,
    ) -> GatewayResult<Option<Gateway>> {
        let mut gateways = self.gateways.write();

        if let Some(new_serial) = changes.serial_number.as_deref() {
            if new_serial != serial && gateways.iter().any(|g| g.serial_number == new_serial) {
                return Err(validation::duplicate_serial(new_serial).into());
            }
        }

        let Some(gateway) = gateways.iter_mut().find(|g| g.serial_number == serial) else {
            return Ok(None);
        };
        gateway.apply(changes);
        Ok(Some(gateway.clone()))
    }

    async fn delete(&self, serial: &str) -> GatewayResult<Option<Gateway>> {
        let mut gateways = self.gateways.write();
        let index = gateways.iter().position(|g| g.serial_number == serial);
        Ok(index.map(|i| gateways.remove(i)))
    }

    async fn push_device(
        &self,
        serial: &str,
        device: Device,
        limit: usize,
    ) -> GatewayResult<Device> {
        let mut gateways = self.gateways.write();
        let gateway = gateways
            .iter_mut()
            .find(|g| g.serial_number == serial)
            .ok_or_else(|| GatewayError::GatewayNotFound(serial.to_string()))?;

        if gateway.device(device.uid).is_some() {
            return Err(validation::duplicate_uid(device.uid).into());
        }
        if gateway.devices.len() >= limit {
            return Err(validation::device_limit_exceeded().into());
        }

        gateway.devices.push(device.clone());
        Ok(device)
    }

    async fn pull_device(&self, serial: &str, uid: i64) -> GatewayResult<Device> {
        let mut gateways = self.gateways.write();
        let gateway = gateways
            .iter_mut()
            .find(|g| g.serial_number == serial)
            .ok_or_else(|| GatewayError::GatewayNotFound(serial.to_string()))?;

        let index = gateway
            .devices
            .iter()
            .position(|d| d.uid == uid)
            .ok_or_else(|| GatewayError::DeviceNotFound {
                serial: serial.to_string(),
                uid,
            })?;

        Ok(gateway.devices.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceStatus;
    use chrono::Utc;

    fn gateway(serial: &str) -> Gateway {
        Gateway {
            serial_number: serial.to_string(),
            name: format!("Gateway {}", serial),
            ip_address: "192.168.1.1".to_string(),
            devices: Vec::new(),
        }
    }

    fn device(uid: i64) -> Device {
        Device {
            uid,
            vendor: "ACME".to_string(),
            date_created: Utc::now(),
            status: DeviceStatus::Online,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_in_order() {
        let store = MemoryStore::new();
        store.insert(gateway("B")).await.unwrap();
        store.insert(gateway("A")).await.unwrap();

        let serials: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.serial_number)
            .collect();
        assert_eq!(serials, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_duplicate_serial_rejected() {
        let store = MemoryStore::new();
        store.insert(gateway("S1")).await.unwrap();

        let err = store.insert(gateway("S1")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(ref v) if v.has_field("serialNumber")));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update("nope", GatewayChanges::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_rename_onto_existing_serial_rejected() {
        let store = MemoryStore::with_gateways(vec![gateway("S1"), gateway("S2")]);
        let changes = GatewayChanges {
            serial_number: Some("S2".to_string()),
            ..Default::default()
        };

        let err = store.update("S1", changes).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(store.get("S1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_returns_record() {
        let store = MemoryStore::with_gateways(vec![gateway("S1")]);
        let removed = store.delete("S1").await.unwrap().unwrap();
        assert_eq!(removed.serial_number, "S1");
        assert!(store.is_empty());
        assert!(store.delete("S1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_push_device_limit_and_duplicates() {
        let store = MemoryStore::with_gateways(vec![gateway("S1")]);
        for uid in 0..9 {
            store.push_device("S1", device(uid), 10).await.unwrap();
        }

        let dup = store.push_device("S1", device(3), 10).await.unwrap_err();
        assert!(matches!(dup, GatewayError::Validation(ref v) if v.has_field("uid")));

        // 9 -> 10 accepted, 10 -> 11 rejected
        store.push_device("S1", device(9), 10).await.unwrap();
        let full = store.push_device("S1", device(10), 10).await.unwrap_err();
        assert!(matches!(full, GatewayError::Validation(ref v) if v.has_field("devices")));

        let gw = store.get("S1").await.unwrap().unwrap();
        assert_eq!(gw.devices.len(), 10);
    }

    #[tokio::test]
    async fn test_push_device_unknown_gateway() {
        let store = MemoryStore::new();
        let err = store.push_device("S1", device(1), 10).await.unwrap_err();
        assert!(matches!(err, GatewayError::GatewayNotFound(s) if s == "S1"));
    }

    #[tokio::test]
    async fn test_pull_device() {
        let store = MemoryStore::with_gateways(vec![gateway("S1")]);
        store.push_device("S1", device(1), 10).await.unwrap();
        store.push_device("S1", device(2), 10).await.unwrap();

        let removed = store.pull_device("S1", 1).await.unwrap();
        assert_eq!(removed.uid, 1);

        let gw = store.get("S1").await.unwrap().unwrap();
        assert_eq!(gw.devices.iter().map(|d| d.uid).collect::<Vec<_>>(), vec![2]);

        let err = store.pull_device("S1", 1).await.unwrap_err();
        assert!(matches!(err, GatewayError::DeviceNotFound { uid: 1, .. }));

        let err = store.pull_device("S9", 2).await.unwrap_err();
        assert!(matches!(err, GatewayError::GatewayNotFound(_)));
    }
}
