//! Environment-driven server configuration, read once at startup.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use services::services::EmbedPolicy;
use services::services::proxy::DEFAULT_UPSTREAM_TIMEOUT;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Applied to both the proxy fetch and the probe. The upstream is
    /// third-party and must not be allowed to hold a request open
    /// indefinitely.
    pub upstream_timeout: Duration,
    pub embed_policy: EmbedPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            embed_policy: EmbedPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// `PREVIEW_PROXY_HOST` / `PREVIEW_PROXY_PORT` for the bind address,
    /// `PREVIEW_PROXY_TIMEOUT_SECS` for the upstream timeout,
    /// `EMBED_DENY_HOSTS` (comma-separated) to replace the default
    /// deny-list. Invalid values log a warning and fall back.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = parse_env("PREVIEW_PROXY_HOST", defaults.bind_addr.ip());
        let port = parse_env("PREVIEW_PROXY_PORT", defaults.bind_addr.port());
        let timeout_secs = parse_env(
            "PREVIEW_PROXY_TIMEOUT_SECS",
            DEFAULT_UPSTREAM_TIMEOUT.as_secs(),
        );

        let embed_policy = match std::env::var("EMBED_DENY_HOSTS") {
            Ok(raw) => EmbedPolicy::new(raw.split(',').map(str::to_string)),
            Err(_) => defaults.embed_policy,
        };

        Self {
            bind_addr: SocketAddr::new(host, port),
            upstream_timeout: Duration::from_secs(timeout_secs),
            embed_policy,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    let raw = match std::env::var(name) {
        Ok(raw) => raw,
        Err(_) => return default,
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default;
    }
    match trimmed.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(
                env_var = name,
                value = %trimmed,
                default = %default,
                "invalid env value; falling back to default"
            );
            default
        }
    }
}
