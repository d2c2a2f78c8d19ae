use tracing::warn;
use waypoint_core::{LinkBoard, LinkRecord};
use waypoint_generator::{CollisionGuard, Generator};

/// Assigns a short code to every card of `board`, in card order.
///
/// Codes are pairwise distinct within the returned list unless a collision
/// survived every retry, in which case the record is marked degraded.
pub fn generate_short_links<G: Generator>(
    board: &LinkBoard,
    guard: &CollisionGuard<G>,
) -> Vec<LinkRecord> {
    let assigned = guard.assign(board.cards.iter().map(|card| card.url.as_str()));

    board
        .cards
        .iter()
        .zip(assigned)
        .map(|(card, assigned)| {
            let degraded = assigned.is_degraded();
            if degraded {
                warn!(url = %card.url, code = %assigned.code, "degraded short code");
            }

            LinkRecord {
                shortcode: assigned.code,
                url: card.url.clone(),
                title: card.text.clone(),
                emoji: card.emoji.clone(),
                degraded,
            }
        })
        .collect()
}

pub fn find_link_by_shortcode<'a>(links: &'a [LinkRecord], code: &str) -> Option<&'a LinkRecord> {
    links.iter().find(|link| link.shortcode.as_str() == code)
}
