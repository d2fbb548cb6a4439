use std::sync::Arc;

use crate::config::Settings;
use crate::domain::services::work_request_lifecycle::WorkRequestLifecycleService;
use crate::infrastructure::db::repositories::Repositories;
use crate::infrastructure::payment::PaymentGateway;

/// Shared application resources used by use cases and services.
pub struct AppContext {
    pub repos: Repositories,
    pub lifecycle: Arc<dyn WorkRequestLifecycleService>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub settings: Settings,
}

impl AppContext {
    /// Build a new application context with shared repositories and services.
    pub fn new(
        repos: Repositories,
        lifecycle: Arc<dyn WorkRequestLifecycleService>,
        gateway: Arc<dyn PaymentGateway>,
        settings: Settings,
    ) -> Self {
        Self {
            repos,
            lifecycle,
            gateway,
            settings,
        }
    }
}
