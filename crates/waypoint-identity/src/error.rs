use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentityError>;

/// Errors raised while resolving identities or talking to a service endpoint.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The identifier could not be mapped to a service endpoint.
    #[error("identity resolution failed: {0}")]
    Resolution(String),

    /// The request never produced a response.
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Every endpoint of a fallback chain failed. `source` is the last error.
    #[error("all {attempts} endpoints failed, last error: {source}")]
    AllCandidatesFailed {
        attempts: usize,
        #[source]
        source: Box<IdentityError>,
    },
}
