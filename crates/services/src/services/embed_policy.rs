//! Shared embedding policy.
//!
//! Some origins block framing in ways no response header reveals, so a
//! deny-list forces `canEmbed: false` for them regardless of what the
//! probe observes. The same list tells the link router which absolute
//! links must be routed through the proxy. One policy object serves both
//! call sites so the hostname check is not duplicated.

use url::Url;

/// Hosts known to refuse embedding even when their headers look permissive.
const DEFAULT_DENY_HOSTS: &[&str] = &["vailamtahministry.com"];

#[derive(Debug, Clone)]
pub struct EmbedPolicy {
    deny_hosts: Vec<String>,
}

impl Default for EmbedPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DENY_HOSTS.iter().map(|h| h.to_string()))
    }
}

impl EmbedPolicy {
    pub fn new(deny_hosts: impl IntoIterator<Item = String>) -> Self {
        Self {
            deny_hosts: deny_hosts
                .into_iter()
                .map(|h| h.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Whether `url` points at a deny-listed host (exact or subdomain).
    ///
    /// Unparseable input falls back to a substring check so a half-typed
    /// URL in the wizard still triggers the override.
    pub fn denies_url(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => parsed
                .host_str()
                .is_some_and(|host| self.denies_host(host)),
            Err(_) => {
                let lower = url.to_ascii_lowercase();
                self.deny_hosts.iter().any(|deny| lower.contains(deny))
            }
        }
    }

    pub fn denies_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.deny_hosts
            .iter()
            .any(|deny| host == *deny || host.ends_with(&format!(".{deny}")))
    }

    pub fn is_empty(&self) -> bool {
        self.deny_hosts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_listed_host_and_subdomains() {
        let policy = EmbedPolicy::default();
        assert!(policy.denies_url("https://vailamtahministry.com/about"));
        assert!(policy.denies_url("https://www.vailamtahministry.com"));
        assert!(!policy.denies_url("https://example.com"));
        assert!(!policy.denies_url("https://notvailamtahministry.com"));
    }

    #[test]
    fn custom_list_replaces_default() {
        let policy = EmbedPolicy::new(["blocked.example".to_string()]);
        assert!(policy.denies_url("http://blocked.example/x"));
        assert!(!policy.denies_url("https://vailamtahministry.com"));
    }

    #[test]
    fn unparseable_input_uses_substring_match() {
        let policy = EmbedPolicy::default();
        assert!(policy.denies_url("vailamtahministry.com/home"));
    }
}
