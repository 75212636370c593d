//! Authenticated GET over reqwest.

use async_trait::async_trait;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderValue},
};

use super::error::TransportError;

/// User agent sent with every request built by [`ReqwestTransport::with_defaults`].
pub const USER_AGENT: &str = "sarge-cli";

/// Status code and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Only `200 OK` counts; other 2xx codes are treated like any other failure.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Issues a GET with a bearer credential.
///
/// Any response with a status line is returned as `Ok`, whatever the code;
/// `Err` is reserved for failures where no response was received.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, bearer: &str) -> Result<HttpResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps an existing client, keeping its connection pool and settings.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with the crate's user agent.
    pub fn with_defaults() -> Result<Self, TransportError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::new(client))
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, bearer))]
    async fn get(&self, url: &str, bearer: &str) -> Result<HttpResponse, TransportError> {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", bearer))
            .map_err(|e| TransportError::Other(format!("invalid credential: {}", e)))?;
        auth_value.set_sensitive(true);

        debug!("GET {}...", url);

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, auth_value)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
