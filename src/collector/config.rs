use reqwest::header::HeaderValue;
use std::time::Duration;

/// Maximum number of attempts when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff cap in seconds when none is configured.
pub const DEFAULT_BASE_DELAY: f64 = 1.0;

/// Per-attempt time budget when none is configured.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reasons a [`FetchConfig`] could not be built.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyCredential,
    InvalidCredential,
    EmptyEndpoint,
    ZeroAttempts,
    InvalidBaseDelay(f64),
    ZeroTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyCredential => write!(f, "API credential must not be empty"),
            ConfigError::InvalidCredential => {
                write!(f, "API credential contains characters not allowed in a header")
            }
            ConfigError::EmptyEndpoint => write!(f, "Endpoint URL must not be empty"),
            ConfigError::ZeroAttempts => write!(f, "max_attempts must be at least 1"),
            ConfigError::InvalidBaseDelay(value) => {
                write!(f, "base_delay must be a positive number of seconds, got {}", value)
            }
            ConfigError::ZeroTimeout => write!(f, "attempt timeout must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable settings for one data source.
///
/// Built once through [`FetchConfig::builder`] and shared by every fetch made
/// against that source.
#[derive(Clone, PartialEq)]
pub struct FetchConfig {
    credential: String,
    endpoint: String,
    max_attempts: u32,
    base_delay: f64,
    attempt_timeout: Duration,
}

impl FetchConfig {
    pub fn builder(
        credential: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> FetchConfigBuilder {
        FetchConfigBuilder {
            credential: credential.into(),
            endpoint: endpoint.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Shorthand for a builder with every default.
    pub fn new(
        credential: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::builder(credential, endpoint).build()
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound, in seconds, on the wait between two attempts.
    pub fn base_delay(&self) -> f64 {
        self.base_delay
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }
}

impl std::fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchConfig")
            .field("credential", &redact(&self.credential))
            .field("endpoint", &self.endpoint)
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

/// Keeps the last four characters of long tokens so they can be told apart in logs.
fn redact(token: &str) -> String {
    let count = token.chars().count();
    if count <= 8 {
        return "*********".to_string();
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("*********{}", tail)
}

#[derive(Clone)]
pub struct FetchConfigBuilder {
    credential: String,
    endpoint: String,
    max_attempts: u32,
    base_delay: f64,
    attempt_timeout: Duration,
}

impl FetchConfigBuilder {
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn base_delay(mut self, seconds: f64) -> Self {
        self.base_delay = seconds;
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<FetchConfig, ConfigError> {
        if self.credential.trim().is_empty() {
            return Err(ConfigError::EmptyCredential);
        }
        if HeaderValue::from_str(&format!("Bearer {}", self.credential)).is_err() {
            return Err(ConfigError::InvalidCredential);
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if !self.base_delay.is_finite() || self.base_delay <= 0.0 {
            return Err(ConfigError::InvalidBaseDelay(self.base_delay));
        }
        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(FetchConfig {
            credential: self.credential,
            endpoint: self.endpoint,
            max_attempts: self.max_attempts,
            base_delay: self.base_delay,
            attempt_timeout: self.attempt_timeout,
        })
    }
}
