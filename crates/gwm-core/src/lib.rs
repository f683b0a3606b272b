//! gwm-core - Core types and rules for the gateway manager
//!
//! This crate owns the gateway/device domain model, the validation rules
//! applied before anything is persisted, and the [`GatewayStore`] trait that
//! lets different document stores back the HTTP layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gwm_core::{GatewayDraft, GatewayService, MemoryStore};
//!
//! let service = GatewayService::new(Arc::new(MemoryStore::new()));
//! let gateway = service
//!     .create_gateway(&GatewayDraft::new("S1", "Lobby", "10.0.0.1"))
//!     .await?;
//! ```

pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{GatewayError, GatewayResult};
pub use models::*;
pub use service::GatewayService;
pub use store::{GatewayStore, MemoryStore};
pub use validation::{FieldError, ValidationErrors, MAX_DEVICES_PER_GATEWAY};
