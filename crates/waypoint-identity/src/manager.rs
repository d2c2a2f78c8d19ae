use crate::client::ServiceClient;
use crate::error::{IdentityError, Result};
use crate::fetch::Fetch;
use crate::resolver::IdentityResolver;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;
use waypoint_core::constants::{PUBLIC_API_ENDPOINT, RESOLVER_ENDPOINT};

/// Configures an [`AgentManager`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct IdentitySettings {
    /// Base URL of the identity resolver.
    #[builder(default = RESOLVER_ENDPOINT.to_string(), setter(into))]
    pub resolver_endpoint: String,
    /// Endpoint used when the account's own PDS is unknown or failing.
    #[builder(default = PUBLIC_API_ENDPOINT.to_string(), setter(into))]
    pub public_endpoint: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Copy)]
enum Candidate {
    Pds,
    Default,
}

/// Hands out [`ServiceClient`]s for an account and remembers resolutions.
///
/// The manager keeps three clients:
///
/// - the default client, bound to the public endpoint, built eagerly and
///   never replaced,
/// - the resolved slot, filled by [`public_agent`](Self::public_agent),
///   which may hold the default client after a failed resolution,
/// - the PDS slot, filled by [`pds_agent`](Self::pds_agent) only on success.
///
/// Slots are held across resolution, so concurrent first calls resolve once.
/// Slots are not keyed by identifier: a manager serves one account until
/// [`reset`](Self::reset).
pub struct AgentManager<F> {
    resolver: IdentityResolver<F>,
    fetch: Arc<F>,
    default_client: ServiceClient<F>,
    resolved: Mutex<Option<ServiceClient<F>>>,
    pds: Mutex<Option<ServiceClient<F>>>,
}

impl<F> std::fmt::Debug for AgentManager<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentManager")
            .field("resolver", &self.resolver)
            .field("default_client", &self.default_client)
            .finish_non_exhaustive()
    }
}

impl<F: Fetch> AgentManager<F> {
    pub fn new(fetch: Arc<F>, settings: IdentitySettings) -> Self {
        let resolver = IdentityResolver::new(Arc::clone(&fetch), settings.resolver_endpoint);
        let default_client = ServiceClient::new(Arc::clone(&fetch), &settings.public_endpoint);

        Self {
            resolver,
            fetch,
            default_client,
            resolved: Mutex::new(None),
            pds: Mutex::new(None),
        }
    }

    pub fn resolver(&self) -> &IdentityResolver<F> {
        &self.resolver
    }

    /// The client bound to the public endpoint.
    pub fn default_client(&self) -> &ServiceClient<F> {
        &self.default_client
    }

    /// Returns a client for `identifier`, preferring its own PDS.
    ///
    /// Never fails: when resolution fails the default client is cached and
    /// returned instead.
    pub async fn public_agent(&self, identifier: &str) -> ServiceClient<F> {
        let mut slot = self.resolved.lock().await;

        if let Some(client) = slot.as_ref() {
            debug!(endpoint = client.endpoint(), "using cached client");
            return client.clone();
        }

        let client = match self.resolver.resolve(identifier).await {
            Ok(resolved) => {
                info!(pds = %resolved.pds, "using resolved PDS endpoint");
                ServiceClient::new(Arc::clone(&self.fetch), &resolved.pds)
            }
            Err(e) => {
                error!(
                    identifier,
                    error = %e,
                    fallback = self.default_client.endpoint(),
                    "resolution failed, falling back to the public endpoint"
                );
                self.default_client.clone()
            }
        };

        *slot = Some(client.clone());
        client
    }

    /// Returns a client bound to the PDS of `identifier`.
    ///
    /// Unlike [`public_agent`](Self::public_agent) a failed resolution is
    /// returned to the caller and nothing is cached.
    pub async fn pds_agent(&self, identifier: &str) -> Result<ServiceClient<F>> {
        let mut slot = self.pds.lock().await;

        if let Some(client) = slot.as_ref() {
            debug!(endpoint = client.endpoint(), "using cached PDS client");
            return Ok(client.clone());
        }

        let resolved = self.resolver.resolve(identifier).await.map_err(|e| {
            error!(identifier, error = %e, "failed to resolve PDS");
            e
        })?;

        let client = ServiceClient::new(Arc::clone(&self.fetch), &resolved.pds);
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Runs `operation` against the PDS and default clients in turn until
    /// one succeeds.
    ///
    /// With `prefer_resolved_first` the PDS client is tried first. A failure
    /// to obtain the PDS client counts as a failed attempt. When every
    /// candidate fails the last error is returned inside
    /// [`IdentityError::AllCandidatesFailed`].
    pub async fn with_fallback<T, Op, Fut>(
        &self,
        identifier: &str,
        operation: Op,
        prefer_resolved_first: bool,
    ) -> Result<T>
    where
        Op: Fn(ServiceClient<F>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let candidates = if prefer_resolved_first {
            [Candidate::Pds, Candidate::Default]
        } else {
            [Candidate::Default, Candidate::Pds]
        };

        let mut attempts = 0;
        let mut last_error = None;

        for candidate in candidates {
            attempts += 1;

            let client = match candidate {
                Candidate::Default => self.default_client.clone(),
                Candidate::Pds => match self.pds_agent(identifier).await {
                    Ok(client) => client,
                    Err(e) => {
                        warn!(error = %e, "no PDS client, trying next endpoint");
                        last_error = Some(e);
                        continue;
                    }
                },
            };

            let endpoint = client.endpoint().to_string();
            match operation(client).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "operation failed, trying next endpoint");
                    last_error = Some(e);
                }
            }
        }

        let source = last_error
            .unwrap_or_else(|| IdentityError::Resolution("no endpoint was tried".to_string()));
        Err(IdentityError::AllCandidatesFailed {
            attempts,
            source: Box::new(source),
        })
    }

    /// Forgets cached resolutions. The default client is kept.
    pub async fn reset(&self) {
        *self.resolved.lock().await = None;
        *self.pds.lock().await = None;
        debug!("cleared cached clients");
    }
}
