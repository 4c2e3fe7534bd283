//! Application state wiring the trigger pipeline to concrete adapters.
//!
//! `TriggerService` is generic over the signer and dispatcher ports;
//! AppState pins it to HMAC-SHA256 and the GitHub client.

use std::sync::Arc;

use automater_core::service::trigger::TriggerService;
use automater_infra::crypto::signer::HmacSha256Signer;
use automater_infra::github::GithubDispatcher;
use automater_types::config::TriggerConfig;

pub type ConcreteTriggerService = TriggerService<HmacSha256Signer, GithubDispatcher>;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConcreteTriggerService>,
    pub config: Arc<TriggerConfig>,
    pub service_name: Arc<str>,
}

impl AppState {
    /// Wire the pipeline. The GitHub client is only built when a token is set.
    pub fn new(config: TriggerConfig) -> anyhow::Result<Self> {
        let dispatcher = GithubDispatcher::from_config(&config.dispatch)?;
        if dispatcher.is_none() {
            if config.dev_mode {
                tracing::warn!("GH_TOKEN not set: dev mode, requests are verified but not dispatched");
            } else {
                tracing::warn!("GH_TOKEN not set: verified requests will fail with Misconfig");
            }
        }
        if config.auth.debug {
            tracing::warn!("debug mode on: signature mismatches echo intermediate values");
        }

        let service = TriggerService::new(&config, HmacSha256Signer::new(), dispatcher);
        let service_name = config.dispatch.service_name();

        Ok(Self {
            service: Arc::new(service),
            config: Arc::new(config),
            service_name: Arc::from(service_name),
        })
    }
}
