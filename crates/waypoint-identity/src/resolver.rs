use crate::error::{IdentityError, Result};
use crate::fetch::{Fetch, FetchRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

const RESOLVE_MINI_DOC: &str = "com.bad-example.identity.resolveMiniDoc";

/// An identifier resolved to its service endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub did: String,
    /// Base URL of the account's PDS.
    pub pds: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MiniDoc {
    did: Option<String>,
    pds: Option<String>,
    handle: Option<String>,
}

/// Resolves account identifiers (DIDs or handles) through a mini-doc
/// resolver service. Results are not cached here.
pub struct IdentityResolver<F> {
    fetch: Arc<F>,
    endpoint: String,
}

impl<F> Clone for IdentityResolver<F> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<F> std::fmt::Debug for IdentityResolver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl<F: Fetch> IdentityResolver<F> {
    pub fn new(fetch: Arc<F>, endpoint: impl Into<String>) -> Self {
        Self {
            fetch,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// URL of the resolution request for `identifier`, with the identifier
    /// percent-encoded.
    pub fn resolve_url(&self, identifier: &str) -> Result<Url> {
        let base = format!(
            "{}/xrpc/{}",
            self.endpoint.trim_end_matches('/'),
            RESOLVE_MINI_DOC
        );
        let mut url = Url::parse(&base).map_err(|e| {
            IdentityError::Resolution(format!("invalid resolver endpoint '{}': {}", self.endpoint, e))
        })?;
        url.query_pairs_mut().append_pair("identifier", identifier);
        Ok(url)
    }

    /// Resolves `identifier` with a single request.
    ///
    /// Fails with [`IdentityError::Resolution`] when the request fails, the
    /// status is not 2xx, the body is not JSON, or `did` or `pds` is missing.
    pub async fn resolve(&self, identifier: &str) -> Result<ResolvedIdentity> {
        info!(identifier, "resolving identity");

        let url = self.resolve_url(identifier)?;
        let response = self
            .fetch
            .fetch(FetchRequest::get(url.as_str()))
            .await
            .map_err(|e| {
                error!(identifier, error = %e, "identity resolver unreachable");
                IdentityError::Resolution(e.to_string())
            })?;

        if !response.is_success() {
            error!(identifier, status = response.status, "identity resolution failed");
            return Err(IdentityError::Resolution(format!(
                "resolver responded with status {}",
                response.status
            )));
        }

        debug!(
            identifier,
            body = %String::from_utf8_lossy(&response.body),
            "resolver response"
        );

        let doc: MiniDoc = response.json().map_err(|e| {
            error!(identifier, error = %e, "resolver response is not valid JSON");
            IdentityError::Resolution(format!("invalid resolver response: {}", e))
        })?;

        let (Some(did), Some(pds)) = (non_empty(doc.did), non_empty(doc.pds)) else {
            return Err(IdentityError::Resolution(
                "resolver response is missing did or pds".to_string(),
            ));
        };

        info!(did = %did, pds = %pds, "resolved identity");
        Ok(ResolvedIdentity {
            did,
            pds,
            handle: doc.handle,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
