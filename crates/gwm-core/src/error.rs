//! Error types shared by the service and the store implementations

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while managing gateways and their devices
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A record failed field validation (missing/malformed field, device
    /// limit exceeded, duplicate serial number or uid)
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Device uid in a path was not an integer
    #[error("Invalid device uid: {0}")]
    InvalidUid(String),

    /// No gateway with the given serial number
    #[error("Gateway not found")]
    GatewayNotFound(String),

    /// The gateway exists but holds no device with this uid
    #[error("Device not found")]
    DeviceNotFound {
        /// Serial number of the owning gateway
        serial: String,
        /// Requested device uid
        uid: i64,
    },

    /// The document store failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl GatewayError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Validation(_) => 400,
            GatewayError::InvalidUid(_) => 400,
            GatewayError::GatewayNotFound(_) => 404,
            GatewayError::DeviceNotFound { .. } => 404,
            GatewayError::Storage(_) => 500,
        }
    }

    /// Whether this error means the addressed resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GatewayError::GatewayNotFound(_) | GatewayError::DeviceNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let validation = ValidationErrors::single("Gateway", "ipAddress", "Invalid IP address");
        assert_eq!(GatewayError::from(validation).status_code(), 400);
        assert_eq!(GatewayError::InvalidUid("abc".into()).status_code(), 400);
        assert_eq!(GatewayError::GatewayNotFound("S1".into()).status_code(), 404);
        assert_eq!(
            GatewayError::DeviceNotFound {
                serial: "S1".into(),
                uid: 3
            }
            .status_code(),
            404
        );
        assert_eq!(GatewayError::Storage("down".into()).status_code(), 500);
    }

    #[test]
    fn test_not_found_messages_are_distinct() {
        let gateway = GatewayError::GatewayNotFound("S1".into()).to_string();
        let device = GatewayError::DeviceNotFound {
            serial: "S1".into(),
            uid: 1,
        }
        .to_string();

        assert_eq!(gateway, "Gateway not found");
        assert_eq!(device, "Device not found");
    }
}
