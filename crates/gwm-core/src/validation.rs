//! Record validation
//!
//! Every write path runs through these functions before the store is touched.
//! Failures are collected per field so callers can report exactly what to fix:
//!
//! ```text
//! Gateway validation failed: ipAddress: Invalid IP address, name: field is required
//! ```

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use validator::Validate;

use crate::error::GatewayError;
use crate::models::{
    Device, DeviceDraft, DeviceStatus, Gateway, GatewayChanges, GatewayDraft, GatewayPatch,
};

/// Maximum number of devices a single gateway may own
pub const MAX_DEVICES_PER_GATEWAY: usize = 10;

/// A single field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire (camelCase) field path, e.g. `ipAddress` or `devices.2.status`
    pub field: String,
    pub message: String,
}

/// All validation failures for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    entity: &'static str,
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            errors: Vec::new(),
        }
    }

    pub fn single(
        entity: &'static str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut errors = Self::new(entity);
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Record type the errors belong to ("Gateway" or "Device")
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any failure is reported against `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Nest another record's errors under `prefix`
    fn merge(&mut self, prefix: &str, other: ValidationErrors) {
        for error in other.errors {
            self.add(format!("{}.{}", prefix, error.field), error.message);
        }
    }

    fn absorb(&mut self, source: validator::ValidationErrors) {
        for (field, errors) in source.field_errors() {
            let field = wire_name(&field);
            for error in errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                self.add(field.clone(), message);
            }
        }
    }

    fn into_result<T>(mut self, value: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.errors.is_empty() {
            self.errors.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(self);
        }
        match value() {
            Some(value) => Ok(value),
            None => {
                self.add("record", "incomplete record");
                Err(self)
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed: ", self.entity)?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a create request into a gateway record
pub fn validate_gateway(
    draft: &GatewayDraft,
    now: DateTime<Utc>,
) -> Result<Gateway, ValidationErrors> {
    let mut errors = ValidationErrors::new("Gateway");
    if let Err(e) = draft.validate() {
        errors.absorb(e);
    }
    let devices = validate_device_list(&draft.devices, now, &mut errors);

    errors.into_result(|| {
        Some(Gateway {
            serial_number: draft.serial_number.clone()?,
            name: draft.name.clone()?,
            ip_address: draft.ip_address.clone()?,
            devices,
        })
    })
}

/// Validate a single device; `now` fills in a missing `dateCreated`
pub fn validate_device(
    draft: &DeviceDraft,
    now: DateTime<Utc>,
) -> Result<Device, ValidationErrors> {
    let mut errors = ValidationErrors::new("Device");
    if let Err(e) = draft.validate() {
        errors.absorb(e);
    }

    let status = match draft.status.as_deref() {
        Some(raw) => match raw.parse::<DeviceStatus>() {
            Ok(status) => Some(status),
            Err(message) => {
                errors.add("status", message);
                None
            }
        },
        None => None,
    };

    let date_created = match draft.date_created.as_deref() {
        None => Some(now),
        Some(raw) => {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                errors.add("dateCreated", format!("`{}` is not a valid date", raw));
            }
            parsed
        }
    };

    errors.into_result(|| {
        Some(Device {
            uid: draft.uid?,
            vendor: draft.vendor.clone()?,
            date_created: date_created?,
            status: status?,
        })
    })
}

/// Validate a partial update; only the fields present are checked
pub fn validate_changes(
    patch: &GatewayPatch,
    now: DateTime<Utc>,
) -> Result<GatewayChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new("Gateway");
    if let Err(e) = patch.validate() {
        errors.absorb(e);
    }
    let devices = patch
        .devices
        .as_ref()
        .map(|drafts| validate_device_list(drafts, now, &mut errors));

    errors.into_result(|| {
        Some(GatewayChanges {
            serial_number: patch.serial_number.clone(),
            name: patch.name.clone(),
            ip_address: patch.ip_address.clone(),
            devices,
        })
    })
}

/// Parse a device uid taken from a path segment
pub fn parse_uid(raw: &str) -> Result<i64, GatewayError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| GatewayError::InvalidUid(raw.to_string()))
}

/// Error reported when appending would push a gateway past the device limit
pub fn device_limit_exceeded() -> ValidationErrors {
    ValidationErrors::single("Gateway", "devices", device_limit_message())
}

/// Error reported when a gateway already holds a device with this uid
pub fn duplicate_uid(uid: i64) -> ValidationErrors {
    ValidationErrors::single(
        "Device",
        "uid",
        format!("uid {} is already used by this gateway", uid),
    )
}

/// Error reported when another gateway already uses this serial number
pub fn duplicate_serial(serial: &str) -> ValidationErrors {
    ValidationErrors::single(
        "Gateway",
        "serialNumber",
        format!("serial number `{}` already exists", serial),
    )
}

fn validate_device_list(
    drafts: &[DeviceDraft],
    now: DateTime<Utc>,
    errors: &mut ValidationErrors,
) -> Vec<Device> {
    let mut devices = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.iter().enumerate() {
        match validate_device(draft, now) {
            Ok(device) => devices.push(device),
            Err(e) => errors.merge(&format!("devices.{}", index), e),
        }
    }

    if drafts.len() > MAX_DEVICES_PER_GATEWAY {
        errors.add("devices", device_limit_message());
    }

    let mut seen = HashSet::new();
    for device in &devices {
        if !seen.insert(device.uid) {
            errors.add("devices", format!("duplicate device uid {}", device.uid));
        }
    }

    devices
}

fn device_limit_message() -> String {
    format!(
        "No more than {} devices are allowed per gateway",
        MAX_DEVICES_PER_GATEWAY
    )
}

/// RFC 3339 timestamps, or bare dates taken as midnight UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// `ip_address` -> `ipAddress`
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
