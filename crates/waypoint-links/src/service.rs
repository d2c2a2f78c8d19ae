use crate::error::{LinkError, Result};
use crate::fetcher::try_fetch_board;
use crate::generator::{find_link_by_shortcode, generate_short_links};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use typed_builder::TypedBuilder;
use waypoint_cache::TtlCache;
use waypoint_core::constants::{DEFAULT_CACHE_TTL, LINKAT_CACHE_PREFIX};
use waypoint_core::{LinkBoard, LinkRecord};
use waypoint_generator::{CollisionGuard, Encoded, EncoderSettings, GuardSettings, ShortcodeEncoder};
use waypoint_identity::{AgentManager, Fetch};

/// Configures a [`LinkService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct LinkServiceSettings {
    /// Account whose link board is served.
    #[builder(setter(into))]
    pub did: String,
    /// How long a fetched board is reused.
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    #[builder(default)]
    pub encoder: EncoderSettings,
    #[builder(default)]
    pub guard: GuardSettings,
}

/// Serves the short links of one account's link board.
///
/// The board is fetched through the [`AgentManager`], PDS first, and cached
/// for `cache_ttl`. Short codes are recomputed from the cached board on every
/// call; they are deterministic, so this yields the same codes until the
/// board changes.
pub struct LinkService<F> {
    did: String,
    manager: Arc<AgentManager<F>>,
    guard: CollisionGuard<ShortcodeEncoder>,
    cache: TtlCache<String, LinkBoard>,
}

impl<F> std::fmt::Debug for LinkService<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkService")
            .field("did", &self.did)
            .field("cached_boards", &self.cache.size())
            .finish_non_exhaustive()
    }
}

impl<F: Fetch> LinkService<F> {
    pub fn new(manager: Arc<AgentManager<F>>, settings: LinkServiceSettings) -> Self {
        let encoder = ShortcodeEncoder::new(settings.encoder);

        Self {
            did: settings.did,
            manager,
            guard: CollisionGuard::new(encoder, settings.guard),
            cache: TtlCache::with_default_ttl(settings.cache_ttl),
        }
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn manager(&self) -> &AgentManager<F> {
        &self.manager
    }

    pub fn encoder(&self) -> &ShortcodeEncoder {
        self.guard.generator()
    }

    fn cache_key(&self) -> String {
        format!("{}{}", LINKAT_CACHE_PREFIX, self.did)
    }

    /// Returns the link board, from cache when fresh.
    ///
    /// Only successful fetches are cached.
    pub async fn fetch_link_data(&self) -> Result<LinkBoard> {
        let key = self.cache_key();

        if let Some(board) = self.cache.get(&key) {
            debug!(key = %key, "link board cache hit");
            return Ok(board);
        }

        info!(did = %self.did, "fetching link board");
        let did = self.did.as_str();
        let board = self
            .manager
            .with_fallback(
                did,
                |client| async move { try_fetch_board(&client, did).await },
                true,
            )
            .await?;

        let Some(board) = board else {
            return Err(LinkError::InvalidBoard {
                did: self.did.clone(),
            });
        };

        info!(did = %self.did, cards = board.cards.len(), "fetched link board");
        self.cache.set_default(key, board.clone());
        Ok(board)
    }

    /// Short links of the board, or the reason they are unavailable.
    pub async fn try_short_links(&self) -> Result<Vec<LinkRecord>> {
        let board = self.fetch_link_data().await?;
        Ok(generate_short_links(&board, &self.guard))
    }

    /// Short links of the board, empty when the board can't be fetched.
    pub async fn get_short_links(&self) -> Vec<LinkRecord> {
        self.try_short_links().await.unwrap_or_else(|e| {
            error!(did = %self.did, error = %e, "failed to load short links");
            Vec::new()
        })
    }

    pub async fn find_short_link(&self, code: &str) -> Option<LinkRecord> {
        let links = self.get_short_links().await;
        find_link_by_shortcode(&links, code).cloned()
    }

    /// Encodes an arbitrary URL with this service's encoder.
    pub fn encode_url(&self, url: &str, length: usize) -> Encoded {
        self.encoder().encode(url, length)
    }

    pub fn is_valid_shortcode(&self, code: &str) -> bool {
        self.encoder().is_valid_shortcode(code)
    }

    /// Drops the cached board so the next call refetches it.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
