//! HTML rewriting for proxied documents.
//!
//! A fetched page refers to its own origin three ways: relative URLs,
//! root-relative URLs, and absolute self-links. Relative URLs are handled
//! by injecting a `<base>` tag, so the text passes below only need to
//! touch root-relative and absolute references. The passes run in a fixed
//! order; the root-relative pass must come before the absolute pass so it
//! never sees proxy paths it would mistake for target paths.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use thiserror::Error;

/// Forces the target's mobile layout inside the simulator frame.
const VIEWPORT_TAG: &str = r#"<meta name="viewport" content="width=device-width, initial-scale=1, maximum-scale=1, user-scalable=0" />"#;

/// Posts the iframe's current location to the parent on every navigation
/// so the simulator can drive its back-button state. Cross-origin framing
/// forbids the parent from reading `window.location` directly.
const NAV_TRACKING_SCRIPT: &str = r#"
<script>
    (function() {
        function notifyParent() {
            try {
                window.parent.postMessage({
                    type: 'convert-webapp-nav-update',
                    url: window.location.href
                }, '*');
            } catch(e) { console.error(e); }
        }
        window.addEventListener('load', notifyParent);
        window.addEventListener('popstate', notifyParent);
        notifyParent();
    })();
</script>
"#;

/// Per-response inputs for one rewrite.
#[derive(Debug, Clone)]
pub struct RewriteContext {
    /// `/api/proxy/{token}/`, always slash-terminated.
    pub proxy_base_path: String,
    /// Decoded target base URL, trailing slash stripped.
    pub target_origin: String,
}

impl RewriteContext {
    pub fn new(token: &str, target_base_url: &str) -> Self {
        Self {
            proxy_base_path: format!("/api/proxy/{token}/"),
            target_origin: target_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("failed to build origin matcher: {0}")]
    OriginPattern(#[from] regex::Error),
}

/// Attributes whose root-relative values must be rebased onto the proxy.
/// `component-url`/`renderer-url` are used by embedded web-component
/// frameworks and load exactly like `src`.
fn root_relative_attr_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(href|src|action|poster|component-url|renderer-url)=(["'])/"#)
            .unwrap()
    })
}

/// `url(` plus an optional quote, for inline `<style>` blocks and style
/// attributes.
fn css_url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"url\((["']?)/"#).unwrap())
}

/// Rewrite a fetched HTML document so every reference into the target
/// origin resolves back through the proxy.
pub fn rewrite_html(html: &str, ctx: &RewriteContext) -> Result<String, RewriteError> {
    let html = inject_header(html, &ctx.proxy_base_path);
    let html = rewrite_root_relative(&html, &ctx.proxy_base_path);
    let html = rewrite_css_urls(&html, &ctx.proxy_base_path);
    let html = rewrite_absolute(&html, ctx)?;
    Ok(inject_nav_tracking(html))
}

/// Insert the viewport meta and `<base>` tag at the top of `<head>`.
///
/// The base tag makes every relative URL in the untouched document resolve
/// against the proxy path; without it the rewrite would have to touch far
/// more of the markup.
fn inject_header(html: &str, proxy_base_path: &str) -> String {
    let injected = format!(r#"{VIEWPORT_TAG}<base href="{proxy_base_path}" />"#);
    if html.contains("<head>") {
        html.replacen("<head>", &format!("<head>{injected}"), 1)
    } else if html.contains("<html>") {
        html.replacen("<html>", &format!("<html><head>{injected}</head>"), 1)
    } else {
        format!("{injected}{html}")
    }
}

/// Prefix root-relative attribute values with the proxy base path.
///
/// Skips protocol-relative values (`//cdn...`) and values already under
/// the proxy base path, so running this pass on its own output changes
/// nothing.
fn rewrite_root_relative(html: &str, proxy_base_path: &str) -> String {
    root_relative_attr_pattern()
        .replace_all(html, |caps: &Captures| {
            let matched = &caps[0];
            let value_start = caps.get(0).map(|m| m.end() - 1).unwrap_or(0);
            let value = &html[value_start..];
            if value.starts_with("//") || value.starts_with(proxy_base_path) {
                return matched.to_string();
            }
            // the leading slash is consumed; the base path ends in one
            format!("{}={}{}", &caps[1], &caps[2], proxy_base_path)
        })
        .into_owned()
}

/// Same prefixing for CSS `url(/...)` references.
fn rewrite_css_urls(html: &str, proxy_base_path: &str) -> String {
    css_url_pattern()
        .replace_all(html, |caps: &Captures| {
            let value_start = caps.get(0).map(|m| m.end() - 1).unwrap_or(0);
            let value = &html[value_start..];
            if value.starts_with("//") || value.starts_with(proxy_base_path) {
                return caps[0].to_string();
            }
            format!("url({}{}", &caps[1], proxy_base_path)
        })
        .into_owned()
}

/// Rewrite absolute links that point back at the target origin.
///
/// Sites emit `href="https://their.own.domain/page"` even where a
/// relative link would do; left alone those escape the proxy and load
/// outside the simulated app. The path keeps its query/fragment (anything
/// up to the closing quote) and drops its leading slash so concatenation
/// with the slash-terminated base path never doubles up.
fn rewrite_absolute(html: &str, ctx: &RewriteContext) -> Result<String, RewriteError> {
    if ctx.target_origin.is_empty() {
        return Ok(html.to_string());
    }
    let pattern = format!(
        r#"(href|src|action)=(["']){}(/[^"']*)?(["'])"#,
        regex::escape(&ctx.target_origin)
    );
    let matcher = Regex::new(&pattern)?;
    Ok(matcher
        .replace_all(html, |caps: &Captures| {
            let path = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            let relative = path.strip_prefix('/').unwrap_or(path);
            format!(
                "{}={}{}{}{}",
                &caps[1], &caps[2], ctx.proxy_base_path, relative, &caps[4]
            )
        })
        .into_owned())
}

/// Append the navigation tracker just before `</body>`, or at the end of
/// a document that has no body close tag.
fn inject_nav_tracking(html: String) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", &format!("{NAV_TRACKING_SCRIPT}</body>"), 1)
    } else {
        format!("{html}{NAV_TRACKING_SCRIPT}")
    }
}
