//! Backend router: builds the generation backend selected in config.

use personachat_config::{AppConfig, BackendKind};
use personachat_core::GenerationBackend;
use personachat_core::error::GenerationError;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::remote::RemoteBackend;
use crate::simulated::SimulatedBackend;

/// Build the configured backend.
///
/// The simulated backend learns persona keys from the same (possibly
/// overridden) persona table the prompt composer uses.
pub fn build_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn GenerationBackend>, GenerationError> {
    let backend: Arc<dyn GenerationBackend> = match config.backend.kind {
        BackendKind::Simulated => {
            let sim = &config.backend.simulated;
            Arc::new(
                SimulatedBackend::new(config.persona_table()).with_latency(
                    Duration::from_millis(sim.min_latency_ms),
                    Duration::from_millis(sim.max_latency_ms),
                ),
            )
        }
        BackendKind::Remote => {
            let remote = &config.backend.remote;
            Arc::new(RemoteBackend::new(
                &remote.api_url,
                remote.api_key.clone().unwrap_or_default(),
                &remote.model,
                Duration::from_secs(remote.timeout_secs),
            )?)
        }
    };

    info!(backend = backend.name(), "Generation backend ready");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_simulated_backend() {
        let backend = build_from_config(&AppConfig::default()).unwrap();
        assert_eq!(backend.name(), "simulated");
    }

    #[test]
    fn remote_kind_builds_remote_backend() {
        let mut config = AppConfig::default();
        config.backend.kind = BackendKind::Remote;
        config.backend.remote.api_key = Some("sk-test".into());
        let backend = build_from_config(&config).unwrap();
        assert_eq!(backend.name(), "remote");
    }
}
