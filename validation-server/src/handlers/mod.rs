use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use feature_flags::flag_matching::UsageTracker;
use feature_flags::refresh::FlagTableHandle;

use crate::baseline::BaselineStore;

pub mod flags;
pub mod scores;

#[derive(Clone)]
pub struct State {
    pub flags: FlagTableHandle,
    pub baselines: Arc<dyn BaselineStore + Send + Sync>,
    pub tracker: Arc<dyn UsageTracker + Send + Sync>,
}

pub fn router(state: State, metrics: Option<PrometheusHandle>) -> Router {
    let router = Router::new()
        .route("/", get(index))
        .route("/flags/v0/evaluate", post(flags::evaluate))
        .route("/scores/v0/validate", post(scores::validate))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Don't install the recorder route unless asked to; a global recorder
    // does not play well with the router being used as a library in tests.
    match metrics {
        Some(recorder_handle) => router.route(
            "/metrics",
            get(move || std::future::ready(recorder_handle.render())),
        ),
        None => router,
    }
}

async fn index() -> &'static str {
    "validation-server"
}
