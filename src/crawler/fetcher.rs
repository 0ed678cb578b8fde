//! HTTP fetcher with bounded retry
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building a reqwest client with timeouts and compression
//! - Per-attempt user-agent selection (fixed or randomized)
//! - Bounded retry on transient status codes and transport errors
//! - Collapsing every outcome into a `FetchOutcome` value
//!
//! Nothing escapes this boundary as an error: callers always receive a
//! `FetchOutcome`, success or failure.

use crate::config::FetchConfig;
use rand::seq::IndexedRandom;
use reqwest::{header::USER_AGENT, Client, Method};
use std::time::Duration;
use url::Url;

/// Result of a fetch operation, retries already spent.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// All attempts exhausted or a non-retryable error occurred
    Failure {
        /// Description of the last error
        reason: String,
        /// Last HTTP status code, if a response was received
        status: Option<u16>,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A small pool of current browser user-agent strings for randomized rotation.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Builds an HTTP client with timeouts and compression enabled
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs HTTP requests with a bounded retry budget.
///
/// `retry_count` is the total number of attempts; an always-failing
/// transient target produces exactly that many requests and then a
/// `FetchOutcome::Failure`. Only status codes in `retry_on` and transport
/// errors are retried; any other status is returned immediately.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Fetches `url` with GET.
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        self.fetch_with(Method::GET, url).await
    }

    /// Fetches `url` with an explicit HTTP method.
    pub async fn fetch_with(&self, method: Method, url: &Url) -> FetchOutcome {
        let attempts = self.config.retry_count.max(1);
        let mut last_failure = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            }

            match self.attempt(method.clone(), url).await {
                Ok(outcome) => {
                    tracing::debug!(
                        "Attempt {}/{} for {} succeeded",
                        attempt,
                        attempts,
                        url
                    );
                    return outcome;
                }
                Err(failure) => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        attempts,
                        url,
                        failure.describe()
                    );
                    last_failure = Some(failure);
                }
            }
        }

        let failure = last_failure.unwrap_or(Transient::Other {
            reason: "no attempts made".to_string(),
        });
        tracing::warn!(
            "Giving up on {} after {} attempts: {}",
            url,
            attempts,
            failure.describe()
        );
        failure.into_outcome()
    }

    /// One attempt. `Ok` carries a terminal outcome (success or a
    /// non-retryable failure); `Err` carries a retryable one.
    async fn attempt(
        &self,
        method: Method,
        url: &Url,
    ) -> Result<FetchOutcome, Transient> {
        let request = self
            .client
            .request(method, url.clone())
            .header(USER_AGENT, self.pick_user_agent());

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                // Transport errors (refused, timeout, TLS) are transient
                return Err(Transient::Network {
                    reason: e.to_string(),
                });
            }
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        if self.config.retry_on.contains(&status) {
            return Err(Transient::Status { status });
        }

        if !response.status().is_success() {
            return Ok(FetchOutcome::Failure {
                reason: format!("HTTP {}", status),
                status: Some(status),
            });
        }

        match response.text().await {
            Ok(body) => Ok(FetchOutcome::Success {
                final_url,
                status,
                body,
            }),
            Err(e) => Err(Transient::Network {
                reason: format!("failed to read body: {}", e),
            }),
        }
    }

    fn pick_user_agent(&self) -> String {
        if let Some(agent) = &self.config.user_agent {
            return agent.clone();
        }
        if self.config.randomize_user_agent {
            if let Some(agent) = USER_AGENTS.choose(&mut rand::rng()) {
                return (*agent).to_string();
            }
        }
        format!("dredge/{}", env!("CARGO_PKG_VERSION"))
    }
}

/// A retryable failure observed during one attempt.
enum Transient {
    Status { status: u16 },
    Network { reason: String },
    Other { reason: String },
}

impl Transient {
    fn describe(&self) -> String {
        match self {
            Self::Status { status } => format!("HTTP {}", status),
            Self::Network { reason } => reason.clone(),
            Self::Other { reason } => reason.clone(),
        }
    }

    fn into_outcome(self) -> FetchOutcome {
        match self {
            Self::Status { status } => FetchOutcome::Failure {
                reason: format!("HTTP {} after retries", status),
                status: Some(status),
            },
            Self::Network { reason } | Self::Other { reason } => FetchOutcome::Failure {
                reason,
                status: None,
            },
        }
    }
}
