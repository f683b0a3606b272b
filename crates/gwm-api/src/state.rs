//! Application state for the gateway API

use std::sync::Arc;
use std::time::Duration;

use gwm_core::{GatewayService, GatewayStore};

/// Default upper bound on a single request
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service: GatewayService,
    request_timeout: Duration,
}

impl AppState {
    /// Create a new AppState over the given store
    pub fn new(store: Arc<dyn GatewayStore>) -> Self {
        Self::with_service(GatewayService::new(store))
    }

    pub fn with_service(service: GatewayService) -> Self {
        Self {
            service,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound every request to `timeout`; slower requests get 408
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn service(&self) -> &GatewayService {
        &self.service
    }

    pub fn store(&self) -> &Arc<dyn GatewayStore> {
        self.service.store()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
