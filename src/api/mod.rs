//! HTTP access to the remote notes resource.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;

use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const NOTES: &str = "notes";

const JSON: &str = "application/json";

/// Successful response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    Json(Value),
    Text(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Cannot build request URL '{url}'")]
    InvalidUrl { url: String },

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        source: reqwest::Error,
    },

    #[error("{method} {url} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        method: Method,
        url: String,
        timeout: Duration,
    },

    #[error("{method} {url} returned HTTP {status}")]
    Status {
        status: StatusCode,
        method: Method,
        url: String,
        body: Option<Body>,
    },

    #[error("{method} {url} returned malformed JSON: {source}")]
    Decode {
        method: Method,
        url: String,
        source: serde_json::Error,
    },
}

impl RequestError {
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `segments` onto the base address, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Result<Url, RequestError> {
        let invalid = || RequestError::InvalidUrl {
            url: format!("{}/{}", self.base_url, segments.join("/")),
        };

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Sends one JSON request. `headers` are applied last and may replace the
    /// default content type.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Body, RequestError> {
        let url = self.url(segments)?;
        let url_str = url.to_string();

        tracing::debug!("Sending {} request to {}", method, url_str);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON))
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|source| RequestError::Transport {
                    method: method.clone(),
                    url: url_str.clone(),
                    source,
                })?;
            read_response(response, &method, &url_str).await
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| RequestError::Timeout {
                method: method.clone(),
                url: url_str.clone(),
                timeout: self.timeout,
            })?
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains(JSON))
}

async fn read_response(
    response: reqwest::Response,
    method: &Method,
    url: &str,
) -> Result<Body, RequestError> {
    let status = response.status();
    let json = is_json(response.headers());
    tracing::debug!("{} {} responded with {}", method, url, status);

    if !status.is_success() {
        let body = match response.bytes().await {
            Ok(bytes) => Some(error_body(&bytes, json)),
            Err(e) => {
                tracing::debug!("Failed to read error body from {}: {}", url, e);
                None
            }
        };
        return Err(RequestError::Status {
            status,
            method: method.clone(),
            url: url.to_string(),
            body,
        });
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(Body::Empty);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| RequestError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        })?;

    if bytes.is_empty() {
        Ok(Body::Empty)
    } else if json {
        serde_json::from_slice(&bytes)
            .map(Body::Json)
            .map_err(|source| RequestError::Decode {
                method: method.clone(),
                url: url.to_string(),
                source,
            })
    } else {
        Ok(Body::Text(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

fn error_body(bytes: &[u8], json: bool) -> Body {
    if bytes.is_empty() {
        return Body::Empty;
    }
    if json && let Ok(value) = serde_json::from_slice(bytes) {
        return Body::Json(value);
    }
    Body::Text(String::from_utf8_lossy(bytes).into_owned())
}
