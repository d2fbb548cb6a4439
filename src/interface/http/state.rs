use std::sync::Arc;

use crate::application::context::AppContext;
use metrics_exporter_prometheus::PrometheusHandle;

/// Shared state handed to every HTTP handler.
///
/// Settings live on the context; the metrics handle is `None` when the
/// Prometheus exporter is disabled.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(ctx: Arc<AppContext>, metrics: Option<PrometheusHandle>) -> Self {
        Self { ctx, metrics }
    }
}
