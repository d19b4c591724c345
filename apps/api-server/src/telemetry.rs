//! Log subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,api_server=debug,writeflow_infra=debug";

#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub json_logs: bool,
}

impl TelemetryConfig {
    /// `LOG_FORMAT=json` for log shippers, anything else for terminals.
    pub fn from_env() -> Self {
        let json_logs = std::env::var("LOG_FORMAT")
            .is_ok_and(|format| format.eq_ignore_ascii_case("json"));
        Self { json_logs }
    }
}

/// Install the global subscriber. `RUST_LOG` replaces the default filter.
pub fn init_telemetry(config: &TelemetryConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // exactly one of the two formatters is present
    let json = config.json_logs.then(|| fmt::layer().json());
    let pretty = (!config.json_logs).then(|| fmt::layer().pretty());

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();

    tracing::info!(json_logs = config.json_logs, "logging ready");
}
