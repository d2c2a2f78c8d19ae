use crate::alphabet::Alphabet;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// A short code identifying a link.
///
/// Codes are produced by the encoder or parsed from a request path. A parsed
/// code is only accepted when every character belongs to the alphabet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(SmolStr);

impl ShortCode {
    /// Creates a new `ShortCode` after validating it against `alphabet`.
    pub fn new(code: impl AsRef<str>, alphabet: &Alphabet) -> std::result::Result<Self, CoreError> {
        let code = code.as_ref();
        Self::validate(code, alphabet)?;
        Ok(Self(SmolStr::new(code)))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by the encoder, which always writes
    /// symbols from its own alphabet.
    pub fn new_unchecked(code: impl AsRef<str>) -> Self {
        Self(SmolStr::new(code))
    }

    /// Generates the full short URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(code: &str, alphabet: &Alphabet) -> std::result::Result<(), CoreError> {
        if code.is_empty() {
            return Err(CoreError::InvalidShortCode("code is empty".to_string()));
        }

        if !alphabet.is_valid(code) {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only symbols from '{}': '{}'",
                alphabet, code
            )));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
