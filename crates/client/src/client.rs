//! Transport client for the resource API.
//!
//! [`Client::build_request`] resolves a relative path against the configured
//! base URL and encodes the body; [`Client::execute`] rate-limits, sends,
//! classifies the status and decodes the JSON response.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::limiter::RateLimiter;

/// Client for the resource API.
///
/// Clones share the HTTP connection pool and the rate limiter.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    headers: HeaderMap,
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
}

impl Client {
    /// Create a client with its own pooled HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if the address cannot be parsed, or a
    /// config error for an unusable header or transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Self::with_http_client(config, http)
    }

    /// Create a client from the environment and defaults.
    ///
    /// # Errors
    ///
    /// See [`Client::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Create a client on top of a caller-supplied HTTP transport.
    ///
    /// # Errors
    ///
    /// See [`Client::new`].
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Result<Self> {
        let base_url = config.base_url()?;
        let headers = header_map(&config)?;

        debug!(base_url = %base_url, rate = config.rate_limit.per_second, "client configured");

        Ok(Self {
            base_url,
            headers,
            http,
            limiter: Arc::new(RateLimiter::new(config.rate_limit)),
        })
    }

    /// The URL every relative path is resolved against.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request for `path`, relative to the base URL.
    ///
    /// Paths are written without a leading slash. For `GET` and `HEAD` the
    /// body, if any, becomes the query string; every other method carries it
    /// as JSON. Default headers are applied to every request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for an unresolvable path and
    /// [`Error::Encode`] when the body cannot be encoded.
    pub fn build_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::invalid_address(path, e.to_string()))?;

        let mut builder = self
            .http
            .request(method.clone(), url)
            .headers(self.headers.clone());

        if let Some(body) = body {
            builder = if matches!(method, Method::GET | Method::HEAD) {
                builder.query(body)
            } else {
                let bytes = serde_json::to_vec(body).map_err(|e| Error::encode(e.to_string()))?;
                debug!(body = %String::from_utf8_lossy(&bytes), "request body");
                builder.body(bytes)
            };
        }

        builder.build().map_err(|e| Error::encode(e.to_string()))
    }

    /// Send `request` and decode the JSON response into `T`.
    ///
    /// # Errors
    ///
    /// Any transport, status or decode failure; [`Error::Cancelled`] when the
    /// context ends first.
    pub async fn execute<T: DeserializeOwned>(&self, ctx: &Context, request: Request) -> Result<T> {
        let response = self.send(ctx, request).await?;
        let body = ctx
            .run(response.bytes())
            .await
            .map_err(Error::cancelled)??;
        serde_json::from_slice(&body).map_err(|e| Error::decode(e.to_string()))
    }

    /// Send `request` when only success or failure matters.
    ///
    /// # Errors
    ///
    /// See [`Client::execute`].
    pub async fn execute_unit(&self, ctx: &Context, request: Request) -> Result<()> {
        self.send(ctx, request).await.map(drop)
    }

    async fn send(&self, ctx: &Context, request: Request) -> Result<Response> {
        if let Some(reason) = ctx.err() {
            return Err(Error::cancelled(reason));
        }
        self.limiter.acquire(ctx).await.map_err(Error::cancelled)?;

        let method = request.method().clone();
        debug!(method = %method, url = %request.url(), "sending request");

        let response = match ctx.run(self.http.execute(request)).await {
            Ok(Ok(response)) => response,
            // The context's reason says more than the transport error it caused.
            Ok(Err(e)) => return Err(ctx.err().map_or(Error::Transport(e), Error::cancelled)),
            Err(reason) => return Err(Error::cancelled(reason)),
        };

        debug!(method = %method, url = %response.url(), status = %response.status(), "received response");
        check_response(ctx, response).await
    }
}

/// One value per header name; a later entry replaces an earlier one.
fn header_map(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(config.headers.len());
    for (name, value) in &config.headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::config(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| Error::config(format!("invalid value for header '{name}': {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Structured error body: an ordered list of `{title, detail}` entries.
#[derive(Debug, Default, Deserialize)]
struct ErrorsPayload {
    #[serde(default)]
    errors: Vec<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

async fn check_response(ctx: &Context, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => return Err(Error::Unauthorized),
        StatusCode::NOT_FOUND => return Err(Error::NotFound),
        _ => {}
    }

    let body = match ctx.run(response.bytes()).await {
        Ok(Ok(body)) => body.to_vec(),
        Ok(Err(_)) => Vec::new(),
        Err(reason) => return Err(Error::cancelled(reason)),
    };
    Err(classify_error_body(status, &body))
}

/// Turn a non-2xx body into the most descriptive error available.
fn classify_error_body(status: StatusCode, body: &[u8]) -> Error {
    let payload = serde_json::from_slice::<ErrorsPayload>(body).unwrap_or_default();
    if payload.errors.is_empty() {
        let line = status_line(status);
        debug!(status = %line, "response carried no error payload");
        return Error::status(line);
    }

    let message = payload
        .errors
        .iter()
        .map(|e| {
            if e.detail.is_empty() {
                e.title.clone()
            } else {
                format!("{}\n\n{}", e.title, e.detail)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    Error::remote(message)
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}
