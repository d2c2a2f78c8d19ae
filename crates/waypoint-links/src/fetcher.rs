//! Reads the link board record from a profile repository.

use serde_json::Value;
use tracing::{error, warn};
use waypoint_core::constants::{LINKAT_COLLECTION, LINKAT_RKEY};
use waypoint_core::{LinkBoard, LinkCard};
use waypoint_identity::{Fetch, IdentityError, ServiceClient};

/// Fetches the board of `did`, returning `None` when the call fails or the
/// record has no `cards` array. Failures are logged.
pub async fn fetch_board<F: Fetch>(client: &ServiceClient<F>, did: &str) -> Option<LinkBoard> {
    match try_fetch_board(client, did).await {
        Ok(board) => board,
        Err(e) => {
            error!(did, endpoint = client.endpoint(), error = %e, "failed to fetch link board");
            None
        }
    }
}

/// Like [`fetch_board`] but keeps request failures apart from a malformed
/// record: `Err` when the endpoint did not answer with the record,
/// `Ok(None)` when the record is not a board.
pub async fn try_fetch_board<F: Fetch>(
    client: &ServiceClient<F>,
    did: &str,
) -> Result<Option<LinkBoard>, IdentityError> {
    let record = client
        .get_record(did, LINKAT_COLLECTION, LINKAT_RKEY)
        .await?;

    Ok(parse_board(&record.value))
}

/// Extracts the cards of a board record. Cards without text or URL are
/// skipped.
pub fn parse_board(value: &Value) -> Option<LinkBoard> {
    let Some(cards) = value.get("cards").and_then(Value::as_array) else {
        warn!("link board record has no cards array");
        return None;
    };

    let cards = cards
        .iter()
        .filter_map(|card| match serde_json::from_value::<LinkCard>(card.clone()) {
            Ok(card) => Some(card),
            Err(e) => {
                warn!(error = %e, "skipping malformed card");
                None
            }
        })
        .collect();

    Some(LinkBoard { cards })
}
