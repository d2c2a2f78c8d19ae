use serde::{Deserialize, Serialize};
use waypoint_core::LinkRecord;

/// `did` reported by the index when no account is configured.
pub const NOT_CONFIGURED_DID: &str = "NOT_CONFIGURED";

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeLink {
    pub shortcode: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl From<&LinkRecord> for HomeLink {
    fn from(link: &LinkRecord) -> Self {
        Self {
            shortcode: link.shortcode.to_string(),
            title: link.title.clone(),
            emoji: link.emoji.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub did: String,
    pub link_count: usize,
    pub links: Vec<HomeLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HomeResponse {
    pub fn failed(did: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            link_count: 0,
            links: Vec::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiLink {
    pub shortcode: String,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub short_url: String,
}

impl From<&LinkRecord> for ApiLink {
    fn from(link: &LinkRecord) -> Self {
        Self {
            shortcode: link.shortcode.to_string(),
            url: link.url.clone(),
            title: link.title.clone(),
            emoji: link.emoji.clone(),
            short_url: link.shortcode.to_url(""),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiLinksResponse {
    pub success: bool,
    pub count: usize,
    pub links: Vec<ApiLink>,
}
