use crate::error::{IdentityError, Result};
use crate::fetch::{Fetch, FetchRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const GET_RECORD: &str = "com.atproto.repo.getRecord";
const GET_PROFILE: &str = "app.bsky.actor.getProfile";

/// A record as returned by `com.atproto.repo.getRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub uri: String,
    #[serde(default)]
    pub cid: Option<String>,
    /// The record body, left untyped.
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A client bound to one service endpoint (a PDS or the public AppView).
///
/// Cloning is cheap and shares the underlying [`Fetch`].
pub struct ServiceClient<F> {
    fetch: Arc<F>,
    endpoint: Arc<str>,
}

impl<F> Clone for ServiceClient<F> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
            endpoint: Arc::clone(&self.endpoint),
        }
    }
}

impl<F> std::fmt::Debug for ServiceClient<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl<F: Fetch> ServiceClient<F> {
    pub fn new(fetch: Arc<F>, endpoint: impl AsRef<str>) -> Self {
        Self {
            fetch,
            endpoint: Arc::from(endpoint.as_ref().trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn get_record(&self, repo: &str, collection: &str, rkey: &str) -> Result<Record> {
        self.query(
            GET_RECORD,
            &[("repo", repo), ("collection", collection), ("rkey", rkey)],
        )
        .await
    }

    pub async fn get_profile(&self, actor: &str) -> Result<Profile> {
        self.query(GET_PROFILE, &[("actor", actor)]).await
    }

    async fn query<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = self.xrpc_url(method, params)?;
        debug!(endpoint = %self.endpoint, method, "xrpc query");

        let response = self
            .fetch
            .fetch(FetchRequest::get(url.as_str()).header("accept", "application/json"))
            .await?;

        if !response.is_success() {
            warn!(
                endpoint = %self.endpoint,
                method,
                status = response.status,
                "xrpc query failed"
            );
            return Err(IdentityError::Status {
                url: url.into(),
                status: response.status,
            });
        }

        response.json()
    }

    fn xrpc_url(&self, method: &str, params: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}/xrpc/{}", self.endpoint, method);
        let mut url = Url::parse(&raw).map_err(|e| IdentityError::Request {
            url: raw.clone(),
            message: e.to_string(),
        })?;
        url.query_pairs_mut().extend_pairs(params.iter().copied());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedFetch;

    fn client(fetch: &ScriptedFetch) -> ServiceClient<ScriptedFetch> {
        ServiceClient::new(Arc::new(fetch.clone()), "https://pds.test/")
    }

    #[test]
    fn endpoint_is_trimmed() {
        assert_eq!(client(&ScriptedFetch::new()).endpoint(), "https://pds.test");
    }

    #[tokio::test]
    async fn get_record_builds_query() {
        let fetch = ScriptedFetch::new().json(
            "getRecord",
            200,
            r#"{"uri":"at://did:plc:abc/blue.linkat.board/self","value":{"cards":[]}}"#,
        );
        let record = client(&fetch)
            .get_record("did:plc:abc", "blue.linkat.board", "self")
            .await
            .unwrap();

        assert_eq!(record.value["cards"], serde_json::json!([]));
        assert_eq!(record.cid, None);

        let requests = fetch.requests();
        assert_eq!(
            requests[0].url,
            "https://pds.test/xrpc/com.atproto.repo.getRecord?repo=did%3Aplc%3Aabc&collection=blue.linkat.board&rkey=self"
        );
    }

    #[tokio::test]
    async fn get_profile_decodes_camel_case() {
        let fetch = ScriptedFetch::new().json(
            "getProfile",
            200,
            r#"{"did":"did:plc:abc","handle":"alice.test","displayName":"Alice"}"#,
        );
        let profile = client(&fetch).get_profile("did:plc:abc").await.unwrap();
        assert_eq!(profile.handle, "alice.test");
        assert_eq!(profile.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let fetch = ScriptedFetch::new().json("getRecord", 400, r#"{"error":"RecordNotFound"}"#);
        let err = client(&fetch)
            .get_record("did:plc:abc", "blue.linkat.board", "self")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn transport_error_is_propagated() {
        let fetch = ScriptedFetch::new().fail("pds.test");
        let err = client(&fetch).get_profile("did:plc:abc").await.unwrap_err();
        assert!(matches!(err, IdentityError::Request { .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let fetch = ScriptedFetch::new().json("getProfile", 200, r#"{"did":1}"#);
        let err = client(&fetch).get_profile("did:plc:abc").await.unwrap_err();
        assert!(matches!(err, IdentityError::Decode(_)));
    }
}
