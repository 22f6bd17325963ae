//! The external fetch layer and its interface boundary
//!
//! The core never speaks HTTP directly; it consumes a `Fetch` implementation
//! that turns a URL into a `FetchResponse`. Status codes fall into three
//! classes the worker cares about: success, redirect (the `Location` header
//! is read), and a reserved 600–699 class meaning the fetch layer *itself*
//! failed (a caching proxy being down is not the same as a remote 5xx) —
//! that class triggers backoff and retry instead of a discard.

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Lower bound of the reserved fetch-layer infrastructure error class
pub const INFRA_STATUS_FLOOR: u16 = 600;

/// Upper bound (inclusive) of the reserved infrastructure error class
pub const INFRA_STATUS_CEIL: u16 = 699;

/// A permanent fetch failure: the URL will not be retried
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Response handed back by the fetch layer
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status, or a 600–699 infrastructure code from the fetch layer
    pub status: u16,

    /// The URL the fetch layer actually retrieved (post any internal redirects)
    pub effective_url: Url,

    /// Response headers, keys lower-cased
    pub headers: HashMap<String, String>,

    /// Response body, absent when the layer returned none
    pub body: Option<Vec<u8>>,
}

impl FetchResponse {
    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 3xx statuses
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Returns true for the reserved fetch-layer infrastructure class
    pub fn is_infrastructure_error(&self) -> bool {
        (INFRA_STATUS_FLOOR..=INFRA_STATUS_CEIL).contains(&self.status)
    }

    /// Resolves the `Location` header against the effective URL
    ///
    /// None when the response is not a redirect, carries no `Location`, or
    /// the target does not resolve.
    pub fn redirect_target(&self) -> Option<Url> {
        if !self.is_redirect() {
            return None;
        }
        let location = self.headers.get("location")?;
        self.effective_url.join(location).ok()
    }

    /// The URL whose content this response represents
    ///
    /// For a redirect-class response this is the resolved `Location` target;
    /// otherwise it is the effective URL the fetch layer reported.
    pub fn final_destination(&self) -> Url {
        self.redirect_target()
            .unwrap_or_else(|| self.effective_url.clone())
    }
}

/// The fetch capability the worker pool consumes
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Retrieves a URL
    ///
    /// `Ok` carries any response the layer produced, including the reserved
    /// infrastructure class; `Err` is a permanent failure the caller should
    /// not retry.
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

/// Direct HTTP implementation of the fetch layer
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the configured identity and timeouts
    ///
    /// Redirects are surfaced to the caller rather than followed, so the
    /// worker can treat redirect targets as distinct frontier identities.
    pub fn new(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(format_user_agent(user_agent))
            .timeout(Duration::from_secs(crawler.fetch_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::none())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let effective_url = response.url().clone();

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();

        let body = match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => return Err(classify_transport_error(e)),
        };

        Ok(FetchResponse {
            status,
            effective_url,
            headers,
            body,
        })
    }
}

/// Formats the user agent string: Name/Version (+ContactURL; ContactEmail)
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

fn classify_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_agent_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    fn crawler_config() -> CrawlerConfig {
        CrawlerConfig {
            workers: 2,
            politeness_delay_ms: 100,
            trap_threshold: 10,
            min_word_count: 100,
            backoff_floor_ms: 1_000,
            backoff_cap_ms: 60_000,
            fetch_timeout_secs: 30,
        }
    }

    fn response(status: u16, headers: &[(&str, &str)]) -> FetchResponse {
        FetchResponse {
            status,
            effective_url: Url::parse("https://example.com/page").unwrap(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: None,
        }
    }

    #[test]
    fn test_build_http_fetcher() {
        assert!(HttpFetcher::new(&crawler_config(), &user_agent_config()).is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        let ua = format_user_agent(&user_agent_config());
        assert_eq!(
            ua,
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[test]
    fn test_status_classes() {
        assert!(response(200, &[]).is_success());
        assert!(response(204, &[]).is_success());
        assert!(response(301, &[]).is_redirect());
        assert!(response(399, &[]).is_redirect());
        assert!(response(600, &[]).is_infrastructure_error());
        assert!(response(699, &[]).is_infrastructure_error());

        // A genuine remote 5xx is not the fetch layer's own failure
        assert!(!response(500, &[]).is_infrastructure_error());
        assert!(!response(404, &[]).is_success());
    }

    #[test]
    fn test_redirect_target_resolution() {
        let resp = response(301, &[("location", "/moved")]);
        assert_eq!(
            resp.redirect_target().unwrap().as_str(),
            "https://example.com/moved"
        );

        let absolute = response(302, &[("location", "https://other.com/page")]);
        assert_eq!(
            absolute.redirect_target().unwrap().as_str(),
            "https://other.com/page"
        );
    }

    #[test]
    fn test_redirect_target_requires_redirect_status() {
        let resp = response(200, &[("location", "/elsewhere")]);
        assert!(resp.redirect_target().is_none());
    }

    #[test]
    fn test_final_destination() {
        let redirect = response(301, &[("location", "/new")]);
        assert_eq!(
            redirect.final_destination().as_str(),
            "https://example.com/new"
        );

        let plain = response(200, &[]);
        assert_eq!(
            plain.final_destination().as_str(),
            "https://example.com/page"
        );
    }
}
