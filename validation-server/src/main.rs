use std::sync::Arc;
use std::time::Duration;

use envconfig::Envconfig;

use feature_flags::flag_definitions::{FlagDefinition, FlagTable, FlagValue, SegmentOverride};
use feature_flags::refresh::{refresh_loop, FlagTableHandle, HttpFlagSource};

use crate::baseline::MemoryBaselineStore;
use crate::config::Config;

mod api;
mod baseline;
mod config;
mod handlers;
mod prometheus;
mod requests;

/// Launch-control defaults, active until the first successful poll of the
/// rollout control plane. Kill switches and remote definitions layer on top.
fn boot_flag_table() -> FlagTable {
    let local = vec![
        FlagDefinition {
            key: "battle_pass".to_string(),
            enabled_value: FlagValue::Bool(true),
            rollout_percentage: 100,
            description: "season battle pass tab".to_string(),
        },
        FlagDefinition {
            key: "clan_wars".to_string(),
            enabled_value: FlagValue::Bool(true),
            rollout_percentage: 20,
            description: "weekend clan leaderboards".to_string(),
        },
        FlagDefinition {
            key: "double_apples".to_string(),
            enabled_value: FlagValue::Bool(true),
            rollout_percentage: 5,
            description: "double apple spawn experiment".to_string(),
        },
        FlagDefinition {
            key: "shop_layout".to_string(),
            enabled_value: FlagValue::String("grid".to_string()),
            rollout_percentage: 100,
            description: "storefront layout variant".to_string(),
        },
    ];

    FlagTable::new(local).with_segment_override(
        "whale",
        "clan_wars",
        SegmentOverride {
            rollout_percentage: Some(100),
            enabled_value: None,
        },
    )
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    let flags = FlagTableHandle::new(boot_flag_table());
    let source = HttpFlagSource::new(config.flag_poll_url.clone())
        .expect("failed to create flag source");
    tokio::spawn(refresh_loop(
        flags.clone(),
        source,
        Duration::from_secs(config.flag_poll_interval_secs),
    ));

    let recorder = config.export_prometheus.then(prometheus::setup_metrics_recorder);

    let state = handlers::State {
        flags,
        baselines: Arc::new(MemoryBaselineStore::default()),
        tracker: Arc::new(prometheus::MetricsUsageTracker),
    };
    let app = handlers::router(state, recorder);

    let listener = tokio::net::TcpListener::bind(config.address)
        .await
        .expect("failed to bind address");
    tracing::info!("listening on {:?}", listener.local_addr().unwrap());

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("validation server exited with error: {}", e);
    }
}
