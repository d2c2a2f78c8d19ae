//! A hand-scripted [`Fetch`] for tests.

use crate::error::{IdentityError, Result};
use crate::fetch::{Fetch, FetchRequest, FetchResponse};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: u16, body: String },
    Fail,
}

/// Answers requests from a list of rules.
///
/// A rule matches when its pattern is a substring of the request URL; the
/// first matching rule wins. Requests matching no rule fail as if the host
/// were unreachable. Clones share rules and the request log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFetch {
    rules: Arc<Mutex<Vec<(String, Reply)>>>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl ScriptedFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers URLs containing `pattern` with `status` and a JSON `body`.
    pub fn json(self, pattern: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.rules.lock().push((
            pattern.into(),
            Reply::Respond {
                status,
                body: body.into(),
            },
        ));
        self
    }

    /// Fails URLs containing `pattern` without a response.
    pub fn fail(self, pattern: impl Into<String>) -> Self {
        self.rules.lock().push((pattern.into(), Reply::Fail));
        self
    }

    /// Drops all rules, so every later request fails.
    pub fn clear_rules(&self) {
        self.rules.lock().clear();
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests whose URL contains `pattern`.
    pub fn count(&self, pattern: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.url.contains(pattern))
            .count()
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        self.requests.lock().push(request.clone());

        let reply = self
            .rules
            .lock()
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Respond { status, body }) => {
                Ok(FetchResponse::new(status, Vec::new(), body.into_bytes()))
            }
            Some(Reply::Fail) | None => Err(IdentityError::Request {
                url: request.url,
                message: "connection refused".to_string(),
            }),
        }
    }
}
