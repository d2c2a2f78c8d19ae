use crate::shortcode::ShortCode;
use serde::{Deserialize, Serialize};

/// One card of a link board, as stored in the profile repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCard {
    /// Display text of the card.
    pub text: String,
    /// Target URL.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// The link board record: an ordered list of cards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkBoard {
    pub cards: Vec<LinkCard>,
}

/// A card with its generated short code.
///
/// Short codes are unique within the batch that produced them only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub shortcode: ShortCode,
    /// Redirect target.
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// The encoder had to fall back somewhere while producing the code:
    /// the URL did not parse, or a collision survived every retry.
    #[serde(default)]
    pub degraded: bool,
}
