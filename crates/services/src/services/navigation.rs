//! In-simulator navigation routing.
//!
//! When the user taps a menu entry or a link inside the simulated device,
//! the destination must be resolved against either the live origin or the
//! proxy's virtual origin — whichever the iframe is currently showing.
//! The resolved value is assigned straight to the iframe `src`, which
//! re-enters the proxy route for the next document.

use url::Url;
use utils::encoding::encode_base_url;

use crate::services::embed_policy::EmbedPolicy;

/// Navigation state for one simulator session.
///
/// Reset whenever the configured target URL changes; mutated on every
/// navigation click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorNavState {
    pub current_iframe_src: String,
    pub is_proxy_mode: bool,
    /// The target as the user configured it, kept for origin comparison
    /// while in proxy mode.
    pub original_target_url: String,
}

impl SimulatorNavState {
    /// Show the target directly in the iframe.
    pub fn direct(target_url: impl Into<String>) -> Self {
        let target_url = target_url.into();
        Self {
            current_iframe_src: target_url.clone(),
            is_proxy_mode: false,
            original_target_url: target_url,
        }
    }

    /// Show the target through the proxy.
    pub fn proxied(target_url: impl Into<String>) -> Self {
        let target_url = target_url.into();
        Self {
            current_iframe_src: proxied_src(&target_url),
            is_proxy_mode: true,
            original_target_url: target_url,
        }
    }

    /// Replace the session when the user edits the configured URL.
    pub fn reset(&mut self, target_url: &str, can_embed: bool) {
        *self = if can_embed {
            Self::direct(target_url)
        } else {
            Self::proxied(target_url)
        };
    }

    /// Resolve a clicked link and record it as the new iframe src.
    pub fn navigate(&mut self, clicked: &str, policy: &EmbedPolicy) -> String {
        let next = resolve(clicked, self, policy);
        self.current_iframe_src = next.clone();
        next
    }
}

/// Build the initial proxied src for a target URL: origin goes into the
/// token, the rest of the URL becomes the remainder path.
pub fn proxied_src(target_url: &str) -> String {
    match Url::parse(target_url) {
        Ok(parsed) => {
            let origin = parsed.origin().ascii_serialization();
            let token = encode_base_url(&origin);
            let remainder = parsed.path().trim_start_matches('/');
            match parsed.query() {
                Some(query) => format!("/api/proxy/{token}/{remainder}?{query}"),
                None => format!("/api/proxy/{token}/{remainder}"),
            }
        }
        // leave a half-typed URL alone; the iframe will show its own error
        Err(_) => target_url.to_string(),
    }
}

/// Decide where a clicked link should take the iframe.
pub fn resolve(clicked: &str, state: &SimulatorNavState, policy: &EmbedPolicy) -> String {
    if state.is_proxy_mode {
        resolve_proxied(clicked, state)
    } else {
        resolve_direct(clicked, state, policy)
    }
}

fn is_absolute(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}

fn resolve_direct(clicked: &str, state: &SimulatorNavState, policy: &EmbedPolicy) -> String {
    if is_absolute(clicked) {
        // Hosts that silently refuse framing never load directly, even
        // when the probe's header heuristic says otherwise.
        if policy.denies_url(clicked) {
            return proxied_src(clicked);
        }
        return clicked.to_string();
    }
    match Url::parse(&state.current_iframe_src).and_then(|base| base.join(clicked)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => clicked.to_string(),
    }
}

fn resolve_proxied(clicked: &str, state: &SimulatorNavState) -> String {
    let Some(proxy_base) = extract_proxy_base(&state.current_iframe_src) else {
        return clicked.to_string();
    };

    if is_absolute(clicked) {
        if same_origin(clicked, &state.original_target_url) {
            return match Url::parse(clicked) {
                Ok(parsed) => {
                    let remainder = parsed.path().trim_start_matches('/');
                    match parsed.query() {
                        Some(query) => format!("{proxy_base}{remainder}?{query}"),
                        None => format!("{proxy_base}{remainder}"),
                    }
                }
                Err(_) => clicked.to_string(),
            };
        }
        // Cross-site link: leave it absolute. It will break out of the
        // simulated frame; cross-site navigation is not proxied
        // transitively.
        return clicked.to_string();
    }

    let relative = clicked.trim_start_matches('/');
    format!("{proxy_base}{relative}")
}

/// Recover `/api/proxy/{token}/` from the live iframe URL: everything up
/// to and including the segment after `proxy`.
fn extract_proxy_base(iframe_src: &str) -> Option<String> {
    let path = iframe_src
        .split(['?', '#'])
        .next()
        .unwrap_or(iframe_src);
    let segments: Vec<&str> = path.split('/').collect();
    let proxy_idx = segments.iter().position(|segment| *segment == "proxy")?;
    let token = segments.get(proxy_idx + 1)?;
    if token.is_empty() {
        return None;
    }
    Some(format!("{}/{token}/", segments[..=proxy_idx].join("/")))
}

fn same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => false,
    }
}
