//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests with a bounded retry budget and a fixed wait between attempts
//! - Failure classification for logging
//!
//! A fetch never raises: once the budget is spent the caller receives
//! [`FetchOutcome::Exhausted`] and decides what to skip.

use crate::config::{FetchConfig, SiteConfig};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Retry budget for a single page or product fetch
///
/// Every call to [`Fetcher::fetch`] starts from a fresh copy of the policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Pause between two attempts
    pub wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            wait,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.attempts, config.wait())
    }
}

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-success status
    Status { status_code: u16 },

    /// Request timed out
    Timeout,

    /// Connection could not be established
    Connect { error: String },

    /// Any other transport or body-decoding error
    Network { error: String },
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status_code } => write!(f, "HTTP status {}", status_code),
            Self::Timeout => write!(f, "request timeout"),
            Self::Connect { error } => write!(f, "connection failed: {}", error),
            Self::Network { error } => write!(f, "network error: {}", error),
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect {
                error: e.to_string(),
            }
        } else {
            Self::Network {
                error: e.to_string(),
            }
        }
    }
}

/// Result of a fetch with retries
#[derive(Debug)]
pub enum FetchOutcome {
    /// The page was downloaded
    Fetched {
        /// Page body
        body: String,
        /// Attempts used, including the successful one
        attempts: u32,
    },

    /// Every attempt failed
    Exhausted {
        /// Attempts made (equal to the policy's budget)
        attempts: u32,
        /// Failure of the last attempt
        last_failure: FetchFailure,
    },
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Fetched { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// The body of a successful fetch
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Fetched { body, .. } => Some(body),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `site` - Site configuration (user agent)
/// * `fetch` - Fetch configuration (request timeout)
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::Config;
/// use catalog_harvest::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.site, &config.fetch).unwrap();
/// ```
pub fn build_http_client(site: &SiteConfig, fetch: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(site.user_agent.clone())
        .timeout(Duration::from_secs(fetch.timeout_seconds))
        .connect_timeout(Duration::from_secs(fetch.timeout_seconds.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GET with a retry budget
///
/// Cloning is cheap: the underlying client is reference counted.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches `url` with the default policy
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        self.fetch_with(url, self.policy).await
    }

    /// Fetches `url`, retrying failed attempts per `policy`
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return body |
    /// | Any other status | Retry after `wait` |
    /// | Timeout / connection / body error | Retry after `wait` |
    /// | Budget spent | Return `Exhausted` |
    ///
    /// For a budget of N attempts a permanently failing URL is requested
    /// exactly N times with N-1 waits in between.
    pub async fn fetch_with(&self, url: &Url, policy: RetryPolicy) -> FetchOutcome {
        let mut remaining = policy.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.get_once(url).await {
                Ok(body) => return FetchOutcome::Fetched { body, attempts },
                Err(failure) => {
                    remaining -= 1;
                    if remaining == 0 {
                        return FetchOutcome::Exhausted {
                            attempts,
                            last_failure: failure,
                        };
                    }

                    tracing::debug!(
                        "Fetching {} failed ({}); attempting {} more time{} in {:?}",
                        url,
                        failure,
                        remaining,
                        if remaining > 1 { "s" } else { "" },
                        policy.wait
                    );
                    tokio::time::sleep(policy.wait).await;
                }
            }
        }
    }

    async fn get_once(&self, url: &Url) -> Result<String, FetchFailure> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status {
                status_code: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
