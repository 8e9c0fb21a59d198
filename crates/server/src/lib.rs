pub mod config;
pub mod routes;

use services::services::{EmbedProbeService, ProxyService};

use crate::config::ServerConfig;

/// Shared handles for the request handlers. Everything inside is a
/// cheap-to-clone client; there is no cross-request state.
#[derive(Clone)]
pub struct AppState {
    pub proxy: ProxyService,
    pub probe: EmbedProbeService,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            proxy: ProxyService::new(config.upstream_timeout)?,
            probe: EmbedProbeService::new(config.embed_policy.clone(), config.upstream_timeout)?,
        })
    }
}
