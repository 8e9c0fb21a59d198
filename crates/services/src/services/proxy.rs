//! Server-side fetching of proxied targets.

use std::time::Duration;

use anyhow::Context as _;
use bytes::Bytes;
use reqwest::header;
use thiserror::Error;
use utils::encoding::{CodecError, decode_base_url};

use crate::services::rewrite::{self, RewriteContext, RewriteError};

/// Mobile Safari identity, distinct from the probe's desktop identity:
/// the proxy wants the target to serve its mobile layout.
const PROXY_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Error)]
pub enum ProxyError {
    /// The wildcard path had no encoded-base segment.
    #[error("Invalid proxy URL")]
    MissingToken,
    /// The first segment was not a decodable token.
    #[error("Invalid URL encoding")]
    BadToken(#[from] CodecError),
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl ProxyError {
    /// Token problems are the client's fault; everything else is a proxy
    /// failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingToken | Self::BadToken(_))
    }
}

/// Result of one proxied fetch.
#[derive(Debug)]
pub enum ProxyPayload {
    /// Rewritten document, served as 200 `text/html`.
    Html(String),
    /// Opaque upstream bytes; status and content type pass through
    /// unchanged. Images, scripts, stylesheets and fonts must not be
    /// treated as text.
    Binary {
        status: u16,
        content_type: String,
        body: Bytes,
    },
}

#[derive(Debug, Clone)]
pub struct ProxyService {
    client: reqwest::Client,
}

impl ProxyService {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build proxy http client")?;
        Ok(Self { client })
    }

    /// Resolve a proxied wildcard path, fetch the target, and classify
    /// the response.
    ///
    /// `path` is everything after `/api/proxy/`: the encoded base token,
    /// then the remainder path on the target origin. `query` is forwarded
    /// verbatim.
    pub async fn handle(&self, path: &str, query: Option<&str>) -> Result<ProxyPayload, ProxyError> {
        let mut segments = path.split('/');
        let token = segments
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or(ProxyError::MissingToken)?;
        let base_url = decode_base_url(token)?;
        let remainder = segments.collect::<Vec<_>>().join("/");

        let upstream_url = build_upstream_url(&base_url, &remainder, query);
        tracing::debug!(target = %upstream_url, "proxying upstream fetch");

        let response = self
            .client
            .get(&upstream_url)
            .header(header::USER_AGENT, PROXY_USER_AGENT)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.contains("text/html") {
            let document = response.text().await?;
            let ctx = RewriteContext::new(token, &base_url);
            let rewritten = rewrite::rewrite_html(&document, &ctx)?;
            Ok(ProxyPayload::Html(rewritten))
        } else {
            let body = response.bytes().await?;
            Ok(ProxyPayload::Binary {
                status,
                content_type,
                body,
            })
        }
    }
}

/// `base` with its trailing slash stripped, then remainder and query.
/// A bare base still produces a valid `base + "/"`.
fn build_upstream_url(base: &str, remainder: &str, query: Option<&str>) -> String {
    let clean_base = base.trim_end_matches('/');
    match query {
        Some(query) if !query.is_empty() => format!("{clean_base}/{remainder}?{query}"),
        _ => format!("{clean_base}/{remainder}"),
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::extract::RawQuery;
    use axum::http::{StatusCode, header::CONTENT_TYPE};
    use axum::routing::get;
    use utils::encoding::encode_base_url;

    use super::*;

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn service() -> ProxyService {
        // reqwest is built without a bundled crypto provider; install one
        // for the test process, mirroring the binary's startup.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        ProxyService::new(Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn upstream_url_concatenation() {
        assert_eq!(
            build_upstream_url("https://a.io/", "x/y", None),
            "https://a.io/x/y"
        );
        assert_eq!(build_upstream_url("https://a.io", "", None), "https://a.io/");
        assert_eq!(
            build_upstream_url("https://a.io", "p", Some("q=1&r=2")),
            "https://a.io/p?q=1&r=2"
        );
        assert_eq!(
            build_upstream_url("https://a.io", "p", Some("")),
            "https://a.io/p"
        );
    }

    #[test]
    fn missing_token_is_a_client_error() {
        assert!(ProxyError::MissingToken.is_client_error());
    }

    #[tokio::test]
    async fn html_responses_are_rewritten() {
        let router = Router::new().route(
            "/page",
            get(|| async {
                (
                    [(CONTENT_TYPE, "text/html; charset=utf-8")],
                    r#"<html><head></head><body><a href="/next">n</a></body></html>"#,
                )
            }),
        );
        let base = spawn_upstream(router).await;
        let token = encode_base_url(&base);

        let payload = service()
            .handle(&format!("{token}/page"), None)
            .await
            .unwrap();
        let ProxyPayload::Html(html) = payload else {
            panic!("expected rewritten html");
        };
        assert!(html.contains(&format!(r#"<base href="/api/proxy/{token}/" />"#)));
        assert!(html.contains(&format!(r#"href="/api/proxy/{token}/next""#)));
        assert!(html.contains("convert-webapp-nav-update"));
    }

    #[tokio::test]
    async fn non_html_bodies_pass_through_byte_identical() {
        let script = "function f(){return '<a href=\"/not-rewritten\">';}";
        let router = Router::new().route(
            "/app.js",
            get(move || async move {
                ([(CONTENT_TYPE, "application/javascript")], script)
            }),
        );
        let base = spawn_upstream(router).await;
        let token = encode_base_url(&base);

        let payload = service()
            .handle(&format!("{token}/app.js"), None)
            .await
            .unwrap();
        let ProxyPayload::Binary {
            status,
            content_type,
            body,
        } = payload
        else {
            panic!("expected passthrough");
        };
        assert_eq!(status, 200);
        assert_eq!(content_type, "application/javascript");
        assert_eq!(body.as_ref(), script.as_bytes());
    }

    #[tokio::test]
    async fn upstream_error_status_is_preserved() {
        let router = Router::new().route(
            "/missing.png",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    [(CONTENT_TYPE, "text/plain")],
                    "no such file",
                )
            }),
        );
        let base = spawn_upstream(router).await;
        let token = encode_base_url(&base);

        let payload = service()
            .handle(&format!("{token}/missing.png"), None)
            .await
            .unwrap();
        let ProxyPayload::Binary { status, .. } = payload else {
            panic!("expected passthrough");
        };
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn query_string_reaches_the_upstream() {
        let router = Router::new().route(
            "/search",
            get(|RawQuery(query): RawQuery| async move {
                ([(CONTENT_TYPE, "application/json")], query.unwrap_or_default())
            }),
        );
        let base = spawn_upstream(router).await;
        let token = encode_base_url(&base);

        let payload = service()
            .handle(&format!("{token}/search"), Some("q=rust&page=2"))
            .await
            .unwrap();
        let ProxyPayload::Binary { body, .. } = payload else {
            panic!("expected passthrough");
        };
        assert_eq!(body.as_ref(), b"q=rust&page=2");
    }

    #[tokio::test]
    async fn bad_token_is_a_client_error() {
        let err = service().handle("@@not-base64@@/x", None).await.unwrap_err();
        assert!(matches!(err, ProxyError::BadToken(_)));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn empty_path_is_a_client_error() {
        let err = service().handle("", None).await.unwrap_err();
        assert!(matches!(err, ProxyError::MissingToken));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_server_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let token = encode_base_url(&format!("http://{addr}"));
        let err = service().handle(&token, None).await.unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(_)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_passthrough() {
        let router = Router::new().route(
            "/raw",
            get(|| async {
                axum::response::Response::builder()
                    .body(axum::body::Body::from("bytes"))
                    .unwrap()
            }),
        );
        let base = spawn_upstream(router).await;
        let token = encode_base_url(&base);

        let payload = service()
            .handle(&format!("{token}/raw"), None)
            .await
            .unwrap();
        let ProxyPayload::Binary { content_type, body, .. } = payload else {
            panic!("expected passthrough");
        };
        assert_eq!(content_type, "");
        assert_eq!(body.as_ref(), b"bytes");
    }
}
