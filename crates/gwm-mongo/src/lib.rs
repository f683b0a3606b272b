//! gwm-mongo - MongoDB storage for the gateway manager
//!
//! Gateways live in a single collection, one document per gateway with the
//! devices embedded as an array. Device additions and removals are single
//! conditional `$push` / `$pull` updates so the ten-device limit holds under
//! concurrent requests.

mod document;
mod store;

pub use document::{DeviceDocument, GatewayDocument};
pub use store::{MongoConfig, MongoStore};
