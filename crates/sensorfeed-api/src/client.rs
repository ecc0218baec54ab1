// Sensor manager HTTP client
//
// Wraps `reqwest::Client` with URL construction relative to the API base,
// status handling, and list-envelope unwrapping. Endpoint groups (history,
// alerts, notifications) are inherent methods implemented in sibling
// modules so this file stays focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ListEnvelope;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in error messages.
const BODY_PREVIEW: usize = 200;

/// Raw HTTP client for the sensor manager API.
///
/// Every read endpoint is a `POST` with a JSON body. All list methods
/// return unwrapped payloads: the caller never sees whether the service
/// answered with a bare array or a `{data: [...]}` wrapper.
#[derive(Clone)]
pub struct SensorClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SensorClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g.
    /// `https://api.iot.loiccapdeville.fr/api/sensormanager`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/{path}`.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/{}", path.trim_start_matches('/'));
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a POST request with a JSON body and decode a list payload.
    pub(crate) async fn post_list<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        let body = Self::success_body(resp).await?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Vec::new());
        }

        let envelope: ListEnvelope<T> = serde_json::from_str(trimmed).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        let items = envelope.into_vec();
        trace!(count = items.len(), "decoded list payload");
        Ok(items)
    }

    /// Send a POST request with a JSON body, ignoring any response body.
    pub(crate) async fn post_unit(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;
        Self::success_body(resp).await?;
        Ok(())
    }

    /// Read the body of a 2xx response, or turn anything else into
    /// `Error::Http` carrying a short body excerpt.
    async fn success_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }
        Ok(resp.text().await?)
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
