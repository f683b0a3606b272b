//! HTTP request handlers for the gateway API
//!
//! These handlers go through GatewayService and are store-agnostic.

pub mod devices;
pub mod gateways;
pub mod health;
