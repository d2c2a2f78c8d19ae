//! Short links for an account's link board.
//!
//! [`LinkService`] fetches the board through the identity layer, caches it,
//! and assigns every card a deterministic short code.

pub mod error;
pub mod fetcher;
pub mod generator;
pub mod service;

pub use error::{LinkError, Result};
pub use fetcher::{fetch_board, parse_board, try_fetch_board};
pub use generator::{find_link_by_shortcode, generate_short_links};
pub use service::{LinkService, LinkServiceSettings};
