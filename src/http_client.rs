use async_trait::async_trait;
use rand::Rng;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

/// User agents to rotate through for unauthenticated API calls
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Get a random user agent from the pool
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())]
}

/// Status and raw body of a completed GET
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors raised by catalog fetches. None of them is fatal to a scan.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Unexpected response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl FetchError {
    /// Status and network failures; the same call may succeed later
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Status { .. })
    }

    pub fn malformed(url: &str, reason: impl Into<String>) -> Self {
        FetchError::Malformed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Performs a GET with the given headers.
///
/// Non-2xx responses are returned as `Ok`; classifying them is the caller's
/// job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<FetchResponse, FetchError>;
}

/// Configuration for the reqwest transport
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: usize,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub enable_gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8000,
            enable_gzip: true,
        }
    }
}

/// reqwest-backed transport that retries throttling and server errors
pub struct HttpTransport {
    client: Client,
    config: HttpClientConfig,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        // cookies come from the acquired session, never from a jar
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .gzip(config.enable_gzip)
            .brotli(config.enable_gzip)
            .redirect(reqwest::redirect::Policy::limited(10))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        Ok(Self { client, config })
    }

    /// Calculate retry delay with exponential backoff and jitter
    fn calculate_retry_delay(&self, attempt: usize) -> Duration {
        let base_delay = self.config.initial_retry_delay_ms;
        let max_delay = self.config.max_retry_delay_ms;

        let delay_ms = base_delay
            .saturating_mul(2u64.saturating_pow(attempt as u32))
            .min(max_delay);

        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(0.75..=1.25);
        Duration::from_millis((delay_ms as f64 * jitter) as u64)
    }

    /// Check if a status code is retryable
    fn is_retryable_status(status: StatusCode) -> bool {
        matches!(
            status.as_u16(),
            // Rate limiting
            429 |
            // Server errors
            500 | 502 | 503 | 504 |
            // Cloudflare errors
            520 | 521 | 522 | 523 | 524 | 525 | 526 | 527
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<FetchResponse, FetchError> {
        let mut attempt = 0;

        loop {
            let result = self.client.get(url).headers(headers.clone()).send().await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if Self::is_retryable_status(status) && attempt < self.config.max_retries {
                        log::warn!(
                            "Received retryable status {} for {}, attempt {}/{}",
                            status,
                            url,
                            attempt + 1,
                            self.config.max_retries + 1
                        );
                        sleep(self.calculate_retry_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }

                    let body = response.text().await?;
                    return Ok(FetchResponse {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(e) => {
                    let should_retry = e.is_timeout() || e.is_connect();

                    if should_retry && attempt < self.config.max_retries {
                        log::warn!(
                            "Request failed for {}, attempt {}/{}: {}",
                            url,
                            attempt + 1,
                            self.config.max_retries + 1,
                            e
                        );
                        sleep(self.calculate_retry_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(FetchError::Network(e));
                }
            }
        }
    }
}
