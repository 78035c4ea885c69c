//! HTTP client for the OAP backend API.
//!
//! Every tool funnels through [`OapClient::call`], which owns URL building,
//! query-string encoding, the `x-api-key` header and JSON decoding. The
//! decoded body is returned whatever the HTTP status, so upstream error
//! payloads reach the caller unchanged. A response without a body is an
//! error.

use std::time::Duration;

use reqwest::{Method, StatusCode, Url};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::UpstreamError;

const API_KEY_HEADER: &str = "x-api-key";

/// Connection settings for [`OapClient`].
#[derive(Debug, Clone)]
pub struct OapClientConfig {
    /// Base URL of the OAP API, e.g. `https://oap.example.com/api`.
    pub base_url: String,
    /// Sent as `x-api-key` when present.
    pub api_key: Option<String>,
    /// Absolute URL of the OCR service used by `post_ocr`.
    pub ocr_url: String,
    pub timeout: Duration,
}

/// Optional body and query parameters of an upstream call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub payload: Option<Value>,
    pub params: Option<Map<String, Value>>,
}

impl CallOptions {
    pub fn params(params: Map<String, Value>) -> Self {
        Self { payload: None, params: Some(params) }
    }

    pub fn with_params(mut self, params: Option<Map<String, Value>>) -> Self {
        self.params = params;
        self
    }
}

#[derive(Debug, Clone)]
pub struct OapClient {
    http: reqwest::Client,
    config: OapClientConfig,
}

impl OapClient {
    pub fn new(config: OapClientConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OapClientConfig {
        &self.config
    }

    /// Call `{base_url}/{endpoint}` and decode the JSON response.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        options: CallOptions,
    ) -> Result<Value, UpstreamError> {
        let mut url = join_url(&self.config.base_url, endpoint)?;
        if let Some(params) = &options.params {
            append_query(&mut url, params);
        }
        info!(%method, endpoint, "calling OAP API");

        let mut request = self.http.request(method.clone(), url);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        self.send(request, endpoint, options.payload).await
    }

    /// POST `payload` to the OCR service.
    ///
    /// The OCR endpoint expects the header even when no key is configured.
    pub async fn post_ocr(&self, payload: Option<Value>) -> Result<Value, UpstreamError> {
        let url = Url::parse(&self.config.ocr_url).map_err(|e| UpstreamError::InvalidUrl {
            url: self.config.ocr_url.clone(),
            message: e.to_string(),
        })?;
        info!(url = %url, "calling OCR API");
        let request = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.config.api_key.as_deref().unwrap_or(""));
        self.send(request, "ocr", payload).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Value, UpstreamError> {
        let request = match payload {
            // `json` also sets `Content-Type: application/json`.
            Some(body) => request.json(&body),
            None => request.header(reqwest::header::CONTENT_TYPE, "application/json"),
        };

        let response = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "OAP API request failed");
            UpstreamError::Transport(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "OAP API returned error status");
        } else {
            debug!(endpoint, status = status.as_u16(), bytes = bytes.len(), "OAP API responded");
        }
        decode_body(endpoint, status, &bytes)
    }
}

fn decode_body(endpoint: &str, status: StatusCode, bytes: &[u8]) -> Result<Value, UpstreamError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(UpstreamError::EmptyBody {
            endpoint: endpoint.to_owned(),
            status: status.as_u16(),
        });
    }
    serde_json::from_slice(bytes).map_err(|_| UpstreamError::NonJson {
        endpoint: endpoint.to_owned(),
        status: status.as_u16(),
    })
}

/// Join base and endpoint with exactly one `/` between them.
fn join_url(base: &str, endpoint: &str) -> Result<Url, UpstreamError> {
    let raw = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    Url::parse(&raw).map_err(|e| UpstreamError::InvalidUrl { url: raw, message: e.to_string() })
}

/// Append `params` as query pairs, keeping any query already on `url`.
///
/// Strings are sent verbatim, `null` is skipped and every other value is
/// sent as its JSON text.
fn append_query(url: &mut Url, params: &Map<String, Value>) {
    if params.values().all(Value::is_null) {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::String(s) => {
                pairs.append_pair(key, s);
            }
            other => {
                pairs.append_pair(key, &other.to_string());
            }
        }
    }
}
