//! Gateway models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::device::{Device, DeviceDraft};

/// A managed gateway and the devices attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gateway {
    /// Globally unique serial number, used as the addressing key
    pub serial_number: String,
    pub name: String,
    /// IPv4 or IPv6 address
    pub ip_address: String,
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl Gateway {
    /// Find a device by uid
    pub fn device(&self, uid: i64) -> Option<&Device> {
        self.devices.iter().find(|d| d.uid == uid)
    }

    /// Apply a validated change set in place
    pub fn apply(&mut self, changes: GatewayChanges) {
        if let Some(serial_number) = changes.serial_number {
            self.serial_number = serial_number;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(ip_address) = changes.ip_address {
            self.ip_address = ip_address;
        }
        if let Some(devices) = changes.devices {
            self.devices = devices;
        }
    }
}

/// Gateway fields as supplied by a caller, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GatewayDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "field is required"),
        length(min = 1, message = "must not be empty")
    )]
    pub serial_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "field is required"),
        length(min = 1, message = "must not be empty")
    )]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "field is required"),
        ip(message = "Invalid IP address")
    )]
    pub ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<DeviceDraft>,
}

impl GatewayDraft {
    pub fn new(
        serial_number: impl Into<String>,
        name: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            serial_number: Some(serial_number.into()),
            name: Some(name.into()),
            ip_address: Some(ip_address.into()),
            devices: Vec::new(),
        }
    }

    pub fn with_device(mut self, device: DeviceDraft) -> Self {
        self.devices.push(device);
        self
    }
}

/// Partial update body; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub serial_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(ip(message = "Invalid IP address"))]
    pub ip_address: Option<String>,

    /// Replaces the whole device list when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceDraft>>,
}

impl GatewayPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// A validated partial update, ready to be persisted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatewayChanges {
    pub serial_number: Option<String>,
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub devices: Option<Vec<Device>>,
}

impl GatewayChanges {
    pub fn is_empty(&self) -> bool {
        self.serial_number.is_none()
            && self.name.is_none()
            && self.ip_address.is_none()
            && self.devices.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceStatus;
    use chrono::Utc;
    use serde_json::json;

    fn gateway() -> Gateway {
        Gateway {
            serial_number: "S1".to_string(),
            name: "N".to_string(),
            ip_address: "10.0.0.1".to_string(),
            devices: vec![Device {
                uid: 7,
                vendor: "V".to_string(),
                date_created: Utc::now(),
                status: DeviceStatus::Online,
            }],
        }
    }

    #[test]
    fn test_gateway_wire_format() {
        let mut gw = gateway();
        gw.devices.clear();

        let value = serde_json::to_value(&gw).unwrap();
        assert_eq!(
            value,
            json!({
                "serialNumber": "S1",
                "name": "N",
                "ipAddress": "10.0.0.1",
                "devices": []
            })
        );
    }

    #[test]
    fn test_find_device() {
        let gw = gateway();
        assert_eq!(gw.device(7).map(|d| d.vendor.as_str()), Some("V"));
        assert!(gw.device(8).is_none());
    }

    #[test]
    fn test_apply_changes_keeps_untouched_fields() {
        let mut gw = gateway();
        gw.apply(GatewayChanges {
            name: Some("Renamed".to_string()),
            ..Default::default()
        });

        assert_eq!(gw.name, "Renamed");
        assert_eq!(gw.serial_number, "S1");
        assert_eq!(gw.ip_address, "10.0.0.1");
        assert_eq!(gw.devices.len(), 1);
    }

    #[test]
    fn test_patch_from_empty_body() {
        let patch: GatewayPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch, GatewayPatch::default());
    }
}
