//! Persisted document layout

use chrono::{DateTime, Utc};
use gwm_core::{Device, DeviceStatus, Gateway};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Gateway as stored in the collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub serial_number: String,
    pub name: String,
    pub ip_address: String,
    #[serde(default)]
    pub devices: Vec<DeviceDocument>,
}

/// Device entry embedded in a gateway document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDocument {
    pub uid: i64,
    pub vendor: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date_created: DateTime<Utc>,
    pub status: DeviceStatus,
}

impl From<Device> for DeviceDocument {
    fn from(device: Device) -> Self {
        Self {
            uid: device.uid,
            vendor: device.vendor,
            date_created: device.date_created,
            status: device.status,
        }
    }
}

impl From<DeviceDocument> for Device {
    fn from(doc: DeviceDocument) -> Self {
        Self {
            uid: doc.uid,
            vendor: doc.vendor,
            date_created: doc.date_created,
            status: doc.status,
        }
    }
}

impl From<Gateway> for GatewayDocument {
    fn from(gateway: Gateway) -> Self {
        Self {
            id: None,
            serial_number: gateway.serial_number,
            name: gateway.name,
            ip_address: gateway.ip_address,
            devices: gateway.devices.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<GatewayDocument> for Gateway {
    fn from(doc: GatewayDocument) -> Self {
        Self {
            serial_number: doc.serial_number,
            name: doc.name,
            ip_address: doc.ip_address,
            devices: doc.devices.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mongodb::bson::{self, doc, Bson};

    fn gateway() -> Gateway {
        Gateway {
            serial_number: "123456".to_string(),
            name: "Gateway 1".to_string(),
            ip_address: "192.168.1.1".to_string(),
            devices: vec![Device {
                uid: 1,
                vendor: "ACME".to_string(),
                date_created: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
                status: DeviceStatus::Offline,
            }],
        }
    }

    #[test]
    fn test_document_layout() {
        let document = bson::to_document(&GatewayDocument::from(gateway())).unwrap();

        assert!(!document.contains_key("_id"));
        assert_eq!(document.get_str("serialNumber").unwrap(), "123456");
        assert_eq!(document.get_str("ipAddress").unwrap(), "192.168.1.1");

        let devices = document.get_array("devices").unwrap();
        let device = devices[0].as_document().unwrap();
        assert_eq!(device.get_i64("uid").unwrap(), 1);
        assert_eq!(device.get_str("status").unwrap(), "offline");
        assert!(matches!(device.get("dateCreated"), Some(Bson::DateTime(_))));
    }

    #[test]
    fn test_round_trip_through_bson() {
        let document = bson::to_document(&GatewayDocument::from(gateway())).unwrap();
        let decoded: GatewayDocument = bson::from_document(document).unwrap();
        assert_eq!(Gateway::from(decoded), gateway());
    }

    #[test]
    fn test_reads_document_without_devices() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "serialNumber": "S1",
            "name": "N",
            "ipAddress": "10.0.0.1",
        };
        let decoded: GatewayDocument = bson::from_document(raw).unwrap();
        assert!(decoded.id.is_some());
        assert!(Gateway::from(decoded).devices.is_empty());
    }
}
