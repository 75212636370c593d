//! Market data collection with bounded retries.
//!
//! # Structure
//!
//! - `config` - Validated, immutable data source settings
//! - `backoff` - Wait schedule between attempts
//! - `observer` - Per-collector event sink (logging by default)
//! - `error` - Typed fetch failures

mod backoff;
mod config;
mod error;
mod observer;

use chrono::{DateTime, Utc};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::http::{HttpResponse, Transport, TransportError};

pub use backoff::{backoff_delay, schedule};
pub use config::{
    ConfigError, DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, FetchConfig,
    FetchConfigBuilder,
};
pub use error::FetchError;
pub use observer::{DEFAULT_LOG_TARGET, FetchObserver, LogObserver};

#[cfg(test)]
pub use observer::MockFetchObserver;

/// A fetched payload stamped with the time it was processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedData {
    pub timestamp: DateTime<Utc>,
    pub raw_data: Value,
}

/// Pulls JSON from one configured endpoint.
///
/// The collector holds no per-call state; concurrent fetches on the same
/// instance are independent.
pub struct DataCollector {
    config: FetchConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn FetchObserver>,
}

impl DataCollector {
    /// Creates a collector that reports through a [`LogObserver`].
    pub fn new(config: FetchConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            observer: Arc::new(LogObserver::default()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches the endpoint's payload as untyped JSON.
    #[tracing::instrument(skip(self), fields(endpoint = %self.config.endpoint()))]
    pub async fn fetch(&self) -> Result<Value, FetchError> {
        self.fetch_as().await
    }

    /// Fetches the endpoint's payload and decodes it into `T`.
    ///
    /// Non-200 responses are retried up to `max_attempts` times in total.
    /// Transport failures and undecodable 200 bodies end the fetch at once.
    pub async fn fetch_as<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        let result = self.run_attempts().await;
        if let Err(e) = &result {
            self.observer.gave_up(e);
        }
        result
    }

    /// Like [`fetch`](Self::fetch), but stops as soon as `signal` completes.
    ///
    /// An attempt in flight or a backoff in progress is abandoned and no
    /// further attempts are made.
    pub async fn fetch_until<F>(&self, signal: F) -> Result<Value, FetchError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.fetch() => result,
            _ = signal => {
                debug!("Fetch from {} cancelled", self.config.endpoint());
                Err(FetchError::Cancelled)
            }
        }
    }

    async fn run_attempts<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        let max_attempts = self.config.max_attempts();

        for attempt in 0..max_attempts {
            let response = self.attempt_once().await?;

            if response.is_ok() {
                debug!("Attempt {}/{} succeeded", attempt + 1, max_attempts);
                return serde_json::from_slice(&response.body).map_err(FetchError::Decode);
            }

            self.observer
                .non_success(attempt + 1, max_attempts, response.status);

            if attempt + 1 < max_attempts {
                let delay = backoff_delay(attempt, self.config.base_delay());
                self.observer.backing_off(attempt + 1, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(FetchError::RetryExhausted {
            attempts: max_attempts,
        })
    }

    async fn attempt_once(&self) -> Result<HttpResponse, FetchError> {
        let timeout = self.config.attempt_timeout();
        let request = self
            .transport
            .get(self.config.endpoint(), self.config.credential());

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(FetchError::Transport(TransportError::Timeout(format!(
                "no response within {:?}",
                timeout
            )))),
        }
    }

    /// Wraps a payload with the current time.
    pub fn process_data(&self, data: Value) -> ProcessedData {
        ProcessedData {
            timestamp: Utc::now(),
            raw_data: data,
        }
    }

    /// Fetches and processes in one step.
    #[tracing::instrument(skip(self))]
    pub async fn collect_and_process(&self) -> Result<ProcessedData, FetchError> {
        let raw = self.fetch().await?;
        Ok(self.process_data(raw))
    }
}
