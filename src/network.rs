use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::Config;

/// Browser identities rotated across requests so consecutive calls do not share a fingerprint.
const BROWSER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
];

/// Pick a random browser identity and tag it with our suffix.
pub fn random_user_agent() -> String {
    let agent = BROWSER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(BROWSER_AGENTS[0]);
    format!("{} {}", agent, Config::UA_SUFFIX)
}

/// Outbound request seam. `HttpClient` is the production implementation;
/// tests plug in fakes to inject failures or observe concurrency.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET a page.
    async fn get(&self, url: &str) -> Result<FetchResult, FetchError>;

    /// POST form-encoded parameters.
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FetchResult, FetchError>;
}

/// HTTP client for search and detail-page requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout_duration: Duration,
    max_content_size: usize,
}

impl HttpClient {
    /// Create a client with the given timeout and TLS policy
    pub fn new(timeout_secs: u64, verify_tls: bool) -> Result<Self, FetchError> {
        Self::with_content_limit(timeout_secs, verify_tls, 10 * 1024 * 1024)
    }

    /// Create a client with a custom content size limit
    pub fn with_content_limit(
        timeout_secs: u64,
        verify_tls: bool,
        max_content_size: usize,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .pool_max_idle_per_host(Config::WORKERS)
            .pool_idle_timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(5))
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout_duration: Duration::from_secs(timeout_secs),
            max_content_size,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<FetchResult, FetchError> {
        let response = timeout(
            self.timeout_duration,
            request
                .header(USER_AGENT, random_user_agent())
                .header(
                    ACCEPT,
                    "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
                )
                .header(ACCEPT_LANGUAGE, "de-DE,de;q=0.9,en;q=0.5")
                .send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(Self::classify_error)?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        if let Some(length) = response.content_length() {
            if length > self.max_content_size as u64 {
                return Err(FetchError::ContentTooLarge(length, self.max_content_size));
            }
        }

        let content = timeout(self.timeout_duration, response.text())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| FetchError::BodyError(e.to_string()))?;

        if content.len() > self.max_content_size {
            return Err(FetchError::ContentTooLarge(
                content.len() as u64,
                self.max_content_size,
            ));
        }

        Ok(FetchResult {
            status_code,
            content,
            final_url,
        })
    }

    /// Classify reqwest errors into our FetchError types
    fn classify_error(error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout;
        }

        let error_msg = error.to_string().to_lowercase();

        if error_msg.contains("connection refused") {
            return FetchError::ConnectionRefused;
        }

        if error_msg.contains("dns") || error_msg.contains("name resolution") {
            return FetchError::DnsError;
        }

        if error_msg.contains("ssl") || error_msg.contains("tls") || error_msg.contains("certificate") {
            return FetchError::SslError;
        }

        FetchError::NetworkError(error.to_string())
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.send(self.client.get(url)).await
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FetchResult, FetchError> {
        self.send(self.client.post(url).form(form)).await
    }
}

/// Response captured from one request
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status_code: u16,
    pub content: String,
    pub final_url: String,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Errors that can occur during HTTP fetching
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Connection refused - server not accepting connections")]
    ConnectionRefused,

    #[error("DNS resolution failed")]
    DnsError,

    #[error("SSL/TLS error - certificate or encryption issue")]
    SslError,

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to read response body: {0}")]
    BodyError(String),

    #[error("Content too large: {0} bytes (max: {1} bytes)")]
    ContentTooLarge(u64, usize),
}
