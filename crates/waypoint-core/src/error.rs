use thiserror::Error;

/// Errors related to the core types of the link shortener.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}
