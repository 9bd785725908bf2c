//! HTTP fetching with bounded retry
//!
//! Every network request made by the update flow goes through [`Fetch`].
//! [`HttpFetcher`] is the production implementation: a `reqwest` client
//! with a fixed identifying `User-Agent`, driven by the retry engine from
//! `dhcli-core` so that connection failures and transient statuses are
//! retried with increasing delays while permanent statuses fail at once.

use async_trait::async_trait;
use bytes::Bytes;
use dhcli_core::retry::{
    HttpFailure, NoOpObserver, RetryError, RetryExecutor, RetryObserver, TracingObserver,
    TransientHttpPredicate,
};
use dhcli_core::types::{NetworkConfig, RetryPolicy};
use dhcli_core::RuntimeConfig;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, UpdateError};

/// Upper bound on the buffer reserved up front from `Content-Length`
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Network primitive used for both the manifest and the artifact
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET `url` and return the full response body
    async fn fetch(&self, url: &str) -> Result<Bytes>;

    /// GET a binary artifact; implementations may show progress
    async fn fetch_artifact(&self, url: &str) -> Result<Bytes> {
        self.fetch(url).await
    }
}

#[async_trait]
impl<T: Fetch + ?Sized> Fetch for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        (**self).fetch(url).await
    }

    async fn fetch_artifact(&self, url: &str) -> Result<Bytes> {
        (**self).fetch_artifact(url).await
    }
}

/// Failure of a single request attempt
#[derive(Debug)]
enum AttemptError {
    Transport(reqwest::Error),
    Status(StatusCode),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Transport(err) => {
                write!(f, "{}", err)?;
                let mut source = err.source();
                while let Some(cause) = source {
                    write!(f, ": {}", cause)?;
                    source = cause.source();
                }
                Ok(())
            }
            AttemptError::Status(status) => write!(f, "HTTP {}", status),
        }
    }
}

impl HttpFailure for AttemptError {
    fn status_code(&self) -> Option<u16> {
        match self {
            AttemptError::Transport(_) => None,
            AttemptError::Status(status) => Some(status.as_u16()),
        }
    }
}

/// `reqwest`-backed fetcher with retry and optional progress display
pub struct HttpFetcher {
    client: reqwest::Client,
    retry_policy: RetryPolicy,
    log_retries: bool,
    show_progress: bool,
    jitter: bool,
}

impl HttpFetcher {
    /// Build a fetcher from network settings and a retry policy
    pub fn new(network: &NetworkConfig, retry_policy: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .user_agent(network.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(network.http_timeout_secs))
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
            .build()
            .map_err(UpdateError::HttpClient)?;

        Ok(Self {
            client,
            retry_policy,
            log_retries: network.log_retries,
            show_progress: network.show_progress,
            jitter: true,
        })
    }

    pub fn from_runtime_config(config: &RuntimeConfig) -> Result<Self> {
        Self::new(&config.network, config.retry.clone())
    }

    /// Enable or disable the artifact download progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Enable or disable random jitter on retry delays
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    async fn get(&self, url: &str, progress: bool) -> Result<Bytes> {
        let observer: Box<dyn RetryObserver> = if self.log_retries {
            Box::new(TracingObserver::new(format!("GET {}", url)))
        } else {
            Box::new(NoOpObserver)
        };

        let result = RetryExecutor::new(self.retry_policy.clone())
            .with_predicate(TransientHttpPredicate)
            .with_observer(observer)
            .with_jitter(self.jitter)
            .execute(|| self.attempt(url, progress))
            .await;

        result.map_err(|err| network_error(url, err))
    }

    async fn attempt(&self, url: &str, progress: bool) -> std::result::Result<Bytes, AttemptError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "request returned non-success status");
            return Err(AttemptError::Status(status));
        }

        let total = response.content_length();
        let bar = progress.then(|| progress_bar(url, total));

        let capacity = total.unwrap_or(0).min(MAX_PREALLOCATION) as usize;
        let mut body = Vec::with_capacity(capacity);
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    if let Some(bar) = &bar {
                        bar.abandon();
                    }
                    return Err(AttemptError::Transport(err));
                }
            };
            body.extend_from_slice(&chunk);
            if let Some(bar) = &bar {
                bar.set_position(body.len() as u64);
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        debug!(url = %url, bytes = body.len(), "fetched");
        Ok(Bytes::from(body))
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.get(url, false).await
    }

    async fn fetch_artifact(&self, url: &str) -> Result<Bytes> {
        self.get(url, self.show_progress).await
    }
}

fn progress_bar(url: &str, total: Option<u64>) -> ProgressBar {
    let name = url.rsplit('/').next().unwrap_or(url).to_string();
    let bar = match total {
        Some(total) => {
            let bar = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        }
        None => ProgressBar::new_spinner(),
    };
    bar.set_message(format!("Downloading {}", name));
    bar
}

fn network_error(url: &str, err: RetryError<AttemptError>) -> UpdateError {
    let (status, cause) = match err {
        RetryError::Exhausted {
            attempts, source, ..
        } => (
            source.status_code(),
            format!("{} (gave up after {} attempts)", source, attempts),
        ),
        RetryError::NonRetryable { source, .. } => (source.status_code(), source.to_string()),
        RetryError::NoAttempts => (None, "retry policy allows no attempts".to_string()),
    };

    UpdateError::Network {
        url: url.to_string(),
        status,
        cause,
    }
}
