// HTTP seam between the client and the network.
//
// The client prepares a fully authenticated `PreparedRequest` and hands it
// to a `Transport`. The transport only moves bytes: status checks, JSON
// decoding and validation stay in the client so they behave the same
// whether the transport is reqwest or a test double.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::error::ApiError;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A request ready to go on the wire: absolute URL with credentials and
/// an optional form-urlencoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
}

/// What came back, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request. Only transport failures are errors here; a
    /// non-2xx answer is still a `RawResponse`.
    async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse, ApiError>;
}

/// reqwest-backed transport used by the CLI.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("premiumize-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse, ApiError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        }
        .header(ACCEPT, "application/json");

        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body.clone());
        }

        // reqwest errors may embed the URL, which carries the API key.
        let res = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.without_url().to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("failed to read body: {}", e.without_url())))?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx_only() {
        let mut res = RawResponse {
            status: 200,
            status_text: "OK".into(),
            body: String::new(),
        };
        assert!(res.is_success());
        res.status = 204;
        assert!(res.is_success());
        res.status = 302;
        assert!(!res.is_success());
        res.status = 500;
        assert!(!res.is_success());
    }
}
