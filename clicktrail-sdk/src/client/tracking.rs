//! Tracking endpoint client (landing page → collector).
//!
//! Two delivery paths exist. [`TrackingClient::send`] is the ordinary JSON
//! request. [`TrackingClient::send_beacon`] mimics a browser beacon: the
//! body goes out as `text/plain` and the request is bounded by a short
//! timeout so a closing page can await it.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use url::Url;

use super::ClientError;
use crate::ENDPOINT_PATH;
use crate::objects::TrackingPayload;

/// Upper bound for a teardown-safe delivery.
pub const DEFAULT_BEACON_TIMEOUT: Duration = Duration::from_secs(2);

const BEACON_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Typed HTTP client for the tracking endpoint.
#[derive(Debug, Clone)]
pub struct TrackingClient {
    http: Client,
    endpoint: Url,
    beacon_timeout: Duration,
}

impl TrackingClient {
    /// Create a client posting to `endpoint` verbatim.
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
            beacon_timeout: DEFAULT_BEACON_TIMEOUT,
        }
    }

    /// Create a client for a collector rooted at `base_url`
    /// (e.g. `https://links.example.com`), posting to [`ENDPOINT_PATH`].
    pub fn from_base(base_url: &Url) -> Result<Self, ClientError> {
        Ok(Self::new(base_url.join(ENDPOINT_PATH)?))
    }

    /// Create a client for a possibly relative `endpoint`, resolved against
    /// the page it is embedded in.
    pub fn for_page(page_url: &Url, endpoint: &str) -> Result<Self, ClientError> {
        Ok(Self::new(page_url.join(endpoint)?))
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn with_beacon_timeout(mut self, timeout: Duration) -> Self {
        self.beacon_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// `POST <endpoint>` with a JSON body. Returns the success status.
    pub async fn send(&self, payload: &TrackingPayload) -> Result<StatusCode, ClientError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        check_status(resp).await
    }

    /// `POST <endpoint>` shaped like a browser beacon.
    pub async fn send_beacon(&self, payload: &TrackingPayload) -> Result<StatusCode, ClientError> {
        let body = payload.to_json()?;

        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, BEACON_CONTENT_TYPE)
            .body(body)
            .timeout(self.beacon_timeout)
            .send()
            .await?;

        check_status(resp).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<StatusCode, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    Ok(status)
}
