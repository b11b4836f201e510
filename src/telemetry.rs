//! Tracing subscriber setup for binaries and tests embedding the store.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TelemetryConfig;

/// Installs a global subscriber. `RUST_LOG` wins over `config.log_level`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(config: &TelemetryConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let cfg = TelemetryConfig {
            log_level: "stockwatch=debug".to_string(),
            json: true,
        };
        let _ = init_tracing(&cfg);
        assert!(!init_tracing(&TelemetryConfig::default()));
        tracing::debug!("subscriber installed");
    }
}
