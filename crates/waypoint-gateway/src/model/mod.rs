mod links;

pub use links::{ApiLink, ApiLinksResponse, HomeLink, HomeResponse, NOT_CONFIGURED_DID};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcode: Option<String>,
}
