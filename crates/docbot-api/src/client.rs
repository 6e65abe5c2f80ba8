// Admin API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, uniform error-body
// decoding and JSON/binary response handling. Endpoint methods live in
// `admin.rs`, `analytics.rs` and `system.rs` as inherent impls so this
// module stays focused on transport mechanics.

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::ErrorBody;

/// Async client for the DocBot admin API.
///
/// Every call issues exactly one HTTP request; retry policy belongs to the
/// caller. Cheap to clone -- the inner `reqwest::Client` is reference
/// counted.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Create a client for `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages headers and timeouts).
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends with `/` so relative joins append rather
    /// than replace the last segment (`http://host/prefix` + `api/...`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Absolute URL for an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint.path())?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn request(&self, endpoint: Endpoint) -> Result<reqwest::RequestBuilder, Error> {
        let url = self.url(endpoint)?;
        let method = endpoint.method();
        debug!(%method, %url, "{endpoint}");
        Ok(self.http.request(method, url))
    }

    /// Send a GET and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, Error> {
        let resp = self.request(endpoint)?.send().await?;
        Self::handle_json(resp).await
    }

    /// Send a GET with query parameters and decode the JSON body.
    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        trace!(?params, "query parameters");
        let resp = self.request(endpoint)?.query(params).send().await?;
        Self::handle_json(resp).await
    }

    /// Send a JSON body and decode the JSON response.
    pub(crate) async fn send_json<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<T, Error> {
        let resp = self.request(endpoint)?.json(body).send().await?;
        Self::handle_json(resp).await
    }

    /// Send a GET and return the raw body bytes.
    pub(crate) async fn get_bytes(&self, endpoint: Endpoint) -> Result<Bytes, Error> {
        let resp = self.request(endpoint)?.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }
        Ok(resp.bytes().await?)
    }

    /// Issue an arbitrary request against an endpoint and decode the JSON
    /// response. Used by callers that need a method/body combination the
    /// typed helpers don't cover.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: Endpoint,
        body: Option<&serde_json::Value>,
    ) -> Result<T, Error> {
        let url = self.url(endpoint)?;
        debug!(%method, %url, "{endpoint} (raw call)");
        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        Self::handle_json(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Decode `{"detail": "..."}`, falling back to the status text.
    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorBody>(&raw).map_or_else(
            |_| {
                status
                    .canonical_reason()
                    .map_or_else(|| status.to_string(), String::from)
            },
            |err| err.detail,
        );

        Error::Http {
            status: status.as_u16(),
            message,
        }
    }
}
