//! The `check` command: verifies that the configured account can be served.

use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::{info, warn};
use waypoint_core::LinkRecord;
use waypoint_generator::{CollisionGuard, Generator};
use waypoint_identity::{AgentManager, Fetch, IdentityError};
use waypoint_links::{generate_short_links, try_fetch_board};

/// Number of links listed in a report.
const PREVIEW_LINKS: usize = 3;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("ATPROTO_DID is not configured")]
    NotConfigured,
    #[error("invalid DID '{0}': it should start with 'did:plc:' or 'did:web:'")]
    InvalidDid(String),
    #[error("could not resolve the PDS endpoint: {0}")]
    Resolution(#[source] IdentityError),
    #[error("could not fetch the profile from the PDS or the public API: {0}")]
    Profile(#[source] IdentityError),
    #[error("could not fetch the link board: {0}")]
    Board(#[source] IdentityError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardStatus {
    Found(Vec<LinkRecord>),
    /// The account has no board record.
    Missing,
    /// The record exists but has no card list.
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub did: String,
    pub pds: String,
    pub handle: String,
    pub board: BoardStatus,
}

/// Accepts `did:plc:` and `did:web:` identifiers with a non-empty body.
pub fn validate_did(did: &str) -> Result<(), CheckError> {
    let body = did
        .strip_prefix("did:plc:")
        .or_else(|| did.strip_prefix("did:web:"));

    match body {
        Some(body) if !body.trim().is_empty() => Ok(()),
        _ => Err(CheckError::InvalidDid(did.to_string())),
    }
}

/// Resolves the account, fetches its profile (PDS first, then the public
/// endpoint) and reads its link board.
///
/// A missing or malformed board is reported, not treated as a failure.
pub async fn run_check<F, G>(
    did: Option<&str>,
    manager: &AgentManager<F>,
    guard: &CollisionGuard<G>,
) -> Result<CheckReport, CheckError>
where
    F: Fetch,
    G: Generator,
{
    let did = did
        .map(str::trim)
        .filter(|did| !did.is_empty())
        .ok_or(CheckError::NotConfigured)?;
    validate_did(did)?;

    let pds_client = manager
        .pds_agent(did)
        .await
        .map_err(CheckError::Resolution)?;
    info!(pds = pds_client.endpoint(), "resolved PDS endpoint");

    let profile = manager
        .with_fallback(did, |client| async move { client.get_profile(did).await }, true)
        .await
        .map_err(CheckError::Profile)?;

    let board = match try_fetch_board(&pds_client, did).await {
        Ok(Some(board)) => BoardStatus::Found(generate_short_links(&board, guard)),
        Ok(None) => BoardStatus::Malformed,
        Err(IdentityError::Status { status, .. }) if status == 400 || status == 404 => {
            warn!(status, "no link board record");
            BoardStatus::Missing
        }
        Err(e) => return Err(CheckError::Board(e)),
    };

    Ok(CheckReport {
        did: did.to_string(),
        pds: pds_client.endpoint().to_string(),
        handle: profile.handle,
        board,
    })
}

impl Display for CheckReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DID: {}", self.did)?;
        writeln!(f, "PDS endpoint: {}", self.pds)?;
        writeln!(f, "Profile: @{}", self.handle)?;

        match &self.board {
            BoardStatus::Found(links) if links.is_empty() => {
                writeln!(f, "Link board is empty, add some links at https://linkat.blue")
            }
            BoardStatus::Found(links) => {
                writeln!(f, "Found link board with {} links", links.len())?;
                writeln!(f, "First links:")?;
                for link in links.iter().take(PREVIEW_LINKS) {
                    writeln!(
                        f,
                        "  {} /{} -> {}",
                        link.emoji.as_deref().unwrap_or("🔗"),
                        link.shortcode,
                        link.url
                    )?;
                }
                Ok(())
            }
            BoardStatus::Missing => {
                writeln!(f, "No link board found, create one at https://linkat.blue")
            }
            BoardStatus::Malformed => {
                writeln!(f, "Link board exists but has an invalid structure")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use waypoint_generator::{GuardSettings, ShortcodeEncoder};
    use waypoint_identity::testing::ScriptedFetch;
    use waypoint_identity::IdentitySettings;

    const DID: &str = "did:plc:abc";
    const MINI_DOC: &str = r#"{"did":"did:plc:abc","pds":"https://pds.test"}"#;
    const PROFILE: &str = r#"{"did":"did:plc:abc","handle":"alice.test"}"#;
    const BOARD: &str = r#"{"uri":"at://did:plc:abc/blue.linkat.board/self","value":{"cards":[
        {"text":"one","url":"https://one.example"},
        {"text":"two","url":"https://two.example","emoji":"✌️"},
        {"text":"three","url":"https://three.example"},
        {"text":"four","url":"https://four.example"}
    ]}}"#;

    fn manager(fetch: &ScriptedFetch) -> AgentManager<ScriptedFetch> {
        AgentManager::new(
            Arc::new(fetch.clone()),
            IdentitySettings::builder()
                .resolver_endpoint("https://resolver.test")
                .public_endpoint("https://public.test")
                .build(),
        )
    }

    fn guard() -> CollisionGuard<ShortcodeEncoder> {
        CollisionGuard::new(ShortcodeEncoder::default(), GuardSettings::default())
    }

    #[test]
    fn did_formats() {
        assert!(validate_did("did:plc:abc123").is_ok());
        assert!(validate_did("did:web:example.com").is_ok());
        assert!(validate_did("did:plc:").is_err());
        assert!(validate_did("did:key:z6Mk").is_err());
        assert!(validate_did("alice.bsky.social").is_err());
    }

    #[tokio::test]
    async fn missing_did_fails() {
        let fetch = ScriptedFetch::new();
        let err = run_check(None, &manager(&fetch), &guard()).await.unwrap_err();
        assert!(matches!(err, CheckError::NotConfigured));

        let err = run_check(Some("  "), &manager(&fetch), &guard()).await.unwrap_err();
        assert!(matches!(err, CheckError::NotConfigured));
    }

    #[tokio::test]
    async fn full_check_reports_first_links() {
        let fetch = ScriptedFetch::new()
            .json("resolver.test", 200, MINI_DOC)
            .json("getProfile", 200, PROFILE)
            .json("getRecord", 200, BOARD);

        let report = run_check(Some(DID), &manager(&fetch), &guard()).await.unwrap();
        assert_eq!(report.pds, "https://pds.test");
        assert_eq!(report.handle, "alice.test");

        let BoardStatus::Found(links) = &report.board else {
            panic!("expected a board, got {:?}", report.board);
        };
        assert_eq!(links.len(), 4);

        let printed = report.to_string();
        assert!(printed.contains("Profile: @alice.test"));
        assert!(printed.contains("✌️"));
        assert!(printed.contains("https://three.example"));
        assert!(!printed.contains("https://four.example"));
    }

    #[tokio::test]
    async fn profile_falls_back_to_public_endpoint() {
        let fetch = ScriptedFetch::new()
            .json("resolver.test", 200, MINI_DOC)
            .json("pds.test/xrpc/app.bsky.actor.getProfile", 502, "{}")
            .json("public.test/xrpc/app.bsky.actor.getProfile", 200, PROFILE)
            .json("getRecord", 200, BOARD);

        let report = run_check(Some(DID), &manager(&fetch), &guard()).await.unwrap();
        assert_eq!(report.handle, "alice.test");
        assert_eq!(fetch.count("public.test"), 1);
    }

    #[tokio::test]
    async fn missing_board_is_not_fatal() {
        let fetch = ScriptedFetch::new()
            .json("resolver.test", 200, MINI_DOC)
            .json("getProfile", 200, PROFILE)
            .json("getRecord", 400, r#"{"error":"RecordNotFound"}"#);

        let report = run_check(Some(DID), &manager(&fetch), &guard()).await.unwrap();
        assert_eq!(report.board, BoardStatus::Missing);
    }

    #[tokio::test]
    async fn unresolvable_did_fails() {
        let fetch = ScriptedFetch::new().json("resolver.test", 404, "{}");
        let err = run_check(Some(DID), &manager(&fetch), &guard()).await.unwrap_err();
        assert!(matches!(err, CheckError::Resolution(_)));
    }
}
