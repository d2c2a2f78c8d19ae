use async_trait::async_trait;
use std::sync::Arc;
use waypoint_core::LinkRecord;
use waypoint_identity::Fetch;
use waypoint_links::{LinkError, LinkService};

/// The link operations the HTTP handlers need.
#[async_trait]
pub trait LinkDirectory: Send + Sync + 'static {
    /// Account the links belong to.
    fn did(&self) -> &str;

    async fn short_links(&self) -> Result<Vec<LinkRecord>, LinkError>;

    async fn find(&self, shortcode: &str) -> Option<LinkRecord>;
}

#[async_trait]
impl<F: Fetch> LinkDirectory for LinkService<F> {
    fn did(&self) -> &str {
        LinkService::did(self)
    }

    async fn short_links(&self) -> Result<Vec<LinkRecord>, LinkError> {
        self.try_short_links().await
    }

    async fn find(&self, shortcode: &str) -> Option<LinkRecord> {
        if !self.is_valid_shortcode(shortcode) {
            return None;
        }
        self.find_short_link(shortcode).await
    }
}

#[derive(Clone)]
pub struct AppState {
    links: Option<Arc<dyn LinkDirectory>>,
}

impl AppState {
    pub fn new(links: Arc<dyn LinkDirectory>) -> Self {
        Self { links: Some(links) }
    }

    /// State for a gateway started without an account.
    pub fn unconfigured() -> Self {
        Self { links: None }
    }

    pub fn links(&self) -> Option<&Arc<dyn LinkDirectory>> {
        self.links.as_ref()
    }
}
