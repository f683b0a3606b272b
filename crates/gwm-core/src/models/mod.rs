//! Gateway and device models
//!
//! Validated records ([`Gateway`], [`Device`], [`GatewayChanges`]) are what
//! stores persist. Drafts ([`GatewayDraft`], [`DeviceDraft`], [`GatewayPatch`])
//! are the loosely-typed request bodies they are validated from.

mod device;
mod gateway;

pub use device::*;
pub use gateway::*;
