//! Reachability and embeddability probing.

use std::time::Duration;

use anyhow::Context as _;
use api_types::EmbedVerdict;
use reqwest::header;

use crate::services::embed_policy::EmbedPolicy;

/// Desktop browser identity. The probe wants the same headers a real
/// browser tab would receive; some origins vary `X-Frame-Options` by
/// client.
const PROBE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// `X-Frame-Options` values that block cross-origin framing.
const BLOCKING_FRAME_OPTIONS: &[&str] = &["deny", "sameorigin", "allow-from"];

#[derive(Debug, Clone)]
pub struct EmbedProbeService {
    client: reqwest::Client,
    policy: EmbedPolicy,
}

impl EmbedProbeService {
    pub fn new(policy: EmbedPolicy, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build probe http client")?;
        Ok(Self { client, policy })
    }

    /// Probe `url` with a single GET and report whether it is reachable
    /// and frameable.
    ///
    /// Never fails: a network error becomes a `{valid: false, canEmbed:
    /// false, error}` verdict, because the caller needs a JSON-shaped
    /// answer to render an inline warning either way. GET rather than
    /// HEAD — some servers only emit `X-Frame-Options` on GET.
    pub async fn probe(&self, url: &str) -> EmbedVerdict {
        let response = match self
            .client
            .get(url)
            .header(header::USER_AGENT, PROBE_USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(url, error = %err, "probe fetch failed");
                return EmbedVerdict::unreachable(format!("failed to fetch URL: {err}"));
            }
        };

        let status = response.status().as_u16();
        let x_frame_options = lowercase_header(&response, "x-frame-options");
        let csp = lowercase_header(&response, "content-security-policy");

        let mut can_embed = true;
        if let Some(xfo) = x_frame_options.as_deref() {
            if BLOCKING_FRAME_OPTIONS.contains(&xfo) {
                can_embed = false;
            }
        }
        // frame-ancestors is almost never going to allow-list this proxy's
        // origin, so any frame directive counts as blocking.
        if let Some(csp) = csp.as_deref() {
            if csp.contains("frame-ancestors") || csp.contains("frame-src") {
                can_embed = false;
            }
        }
        if self.policy.denies_url(url) {
            can_embed = false;
        }

        EmbedVerdict::reached(status, can_embed, x_frame_options)
    }
}

fn lowercase_header(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase())
}
