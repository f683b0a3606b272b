//! Device models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Connectivity status reported for a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(DeviceStatus::Online),
            "offline" => Ok(DeviceStatus::Offline),
            other => Err(format!(
                "`{}` is not a valid status (expected online or offline)",
                other
            )),
        }
    }
}

/// A device embedded in a gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Numeric identifier, unique within the owning gateway
    pub uid: i64,
    pub vendor: String,
    pub date_created: DateTime<Utc>,
    pub status: DeviceStatus,
}

/// Device fields as supplied by a caller, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(required(message = "field is required"))]
    pub uid: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "field is required"),
        length(min = 1, message = "must not be empty")
    )]
    pub vendor: Option<String>,

    /// RFC 3339 timestamp or `YYYY-MM-DD`; defaults to the creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(required(message = "field is required"))]
    pub status: Option<String>,
}

impl DeviceDraft {
    pub fn new(uid: i64, vendor: impl Into<String>, status: DeviceStatus) -> Self {
        Self {
            uid: Some(uid),
            vendor: Some(vendor.into()),
            date_created: None,
            status: Some(status.to_string()),
        }
    }

    pub fn with_date_created(mut self, date_created: impl Into<String>) -> Self {
        self.date_created = Some(date_created.into());
        self
    }
}

impl From<&Device> for DeviceDraft {
    fn from(device: &Device) -> Self {
        Self {
            uid: Some(device.uid),
            vendor: Some(device.vendor.clone()),
            date_created: Some(device.date_created.to_rfc3339()),
            status: Some(device.status.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_status_parse() {
        assert_eq!("online".parse::<DeviceStatus>(), Ok(DeviceStatus::Online));
        assert_eq!("offline".parse::<DeviceStatus>(), Ok(DeviceStatus::Offline));
        assert!("Online".parse::<DeviceStatus>().is_err());
        assert!("idle".parse::<DeviceStatus>().is_err());
    }

    #[test]
    fn test_device_wire_format() {
        let device = Device {
            uid: 5,
            vendor: "ACME".to_string(),
            date_created: Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            status: DeviceStatus::Online,
        };

        let value = serde_json::to_value(&device).unwrap();
        assert_eq!(
            value,
            json!({
                "uid": 5,
                "vendor": "ACME",
                "dateCreated": "2022-01-01T00:00:00Z",
                "status": "online"
            })
        );
    }

    #[test]
    fn test_draft_skips_missing_fields() {
        let draft = DeviceDraft::new(1, "V", DeviceStatus::Offline);
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value, json!({"uid": 1, "vendor": "V", "status": "offline"}));
    }

    #[test]
    fn test_draft_accepts_partial_body() {
        let draft: DeviceDraft = serde_json::from_value(json!({"vendor": "V"})).unwrap();
        assert_eq!(draft.uid, None);
        assert_eq!(draft.vendor.as_deref(), Some("V"));
        assert_eq!(draft.status, None);
    }
}
