//! Outbound HTTP as an injectable capability.
//!
//! Everything in this crate talks to the network through [`Fetch`], so tests
//! can script responses without a server. [`HttpFetch`] is the real
//! implementation.

use crate::error::{IdentityError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{trace, warn};
use ureq::Agent;

/// Timeout applied to a whole request, connect to last body byte.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Content type assumed when a response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Builds a response, adding `content-type: application/json` when the
    /// headers carry no content type.
    pub fn new(status: u16, mut headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        let has_content_type = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
        if !has_content_type {
            headers.push(("content-type".to_string(), DEFAULT_CONTENT_TYPE.to_string()));
        }

        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> &str {
        self.header("content-type").unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Performs one HTTP exchange.
///
/// Non-2xx statuses are responses, not errors. An `Err` means no response
/// was received at all.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

/// [`Fetch`] backed by a shared blocking `ureq` agent.
///
/// Each request runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    agent: Agent,
}

impl HttpFetch {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }

    fn fetch_sync(agent: &Agent, request: FetchRequest) -> Result<FetchResponse> {
        let FetchRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let request_error = |e: ureq::Error| IdentityError::Request {
            url: url.clone(),
            message: e.to_string(),
        };

        let response = match method {
            Method::Get => {
                let mut builder = agent.get(&url);
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            Method::Post => {
                let mut builder = agent.post(&url);
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(body.unwrap_or_default())
            }
        }
        .map_err(request_error)?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .into_body()
            .read_to_vec()
            .map_err(request_error)?;

        trace!(url = %url, status, bytes = body.len(), "fetched");
        Ok(FetchResponse::new(status, response_headers, body))
    }
}

impl Default for HttpFetch {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let agent = self.agent.clone();
        let url = request.url.clone();

        tokio::task::spawn_blocking(move || HttpFetch::fetch_sync(&agent, request))
            .await
            .unwrap_or_else(|e| {
                warn!(url = %url, error = %e, "blocking fetch task failed");
                Err(IdentityError::Request {
                    url,
                    message: e.to_string(),
                })
            })
    }
}
