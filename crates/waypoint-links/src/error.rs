use thiserror::Error;
use waypoint_identity::IdentityError;

pub type Result<T> = std::result::Result<T, LinkError>;

#[derive(Debug, Error)]
pub enum LinkError {
    /// No endpoint could serve the board.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The record exists but holds no usable card list.
    #[error("link board for {did} is missing or malformed")]
    InvalidBoard { did: String },
}
