use std::sync::Arc;
use std::time::Duration;
use waypoint_identity::testing::ScriptedFetch;
use waypoint_identity::{AgentManager, IdentityError, IdentitySettings};
use waypoint_links::{LinkError, LinkService, LinkServiceSettings};

const DID: &str = "did:plc:linkowner";
const MINI_DOC: &str = r#"{"did":"did:plc:linkowner","pds":"https://pds.test"}"#;
const BOARD: &str = r#"{
    "uri": "at://did:plc:linkowner/blue.linkat.board/self",
    "value": {
        "cards": [
            {"text": "GitHub", "url": "https://github.com/octocat", "emoji": "🐙"},
            {"text": "Docs", "url": "https://docs.github.com/en"},
            {"text": "Blog", "url": "https://blog.example.co.uk/posts?b=2&a=1"}
        ]
    }
}"#;

fn service_with(fetch: &ScriptedFetch, ttl: Duration) -> LinkService<ScriptedFetch> {
    let manager = AgentManager::new(
        Arc::new(fetch.clone()),
        IdentitySettings::builder()
            .resolver_endpoint("https://resolver.test")
            .public_endpoint("https://public.test")
            .build(),
    );
    LinkService::new(
        Arc::new(manager),
        LinkServiceSettings::builder().did(DID).cache_ttl(ttl).build(),
    )
}

fn service(fetch: &ScriptedFetch) -> LinkService<ScriptedFetch> {
    service_with(fetch, Duration::from_secs(300))
}

fn healthy_fetch() -> ScriptedFetch {
    ScriptedFetch::new()
        .json("resolver.test", 200, MINI_DOC)
        .json("pds.test", 200, BOARD)
}

#[tokio::test]
async fn board_is_read_from_the_pds() {
    let fetch = healthy_fetch();
    let service = service(&fetch);

    let links = service.get_short_links().await;
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].title, "GitHub");
    assert_eq!(links[0].emoji.as_deref(), Some("🐙"));
    assert_eq!(fetch.count("pds.test"), 1);
    assert_eq!(fetch.count("public.test"), 0);
}

#[tokio::test]
async fn board_is_cached() {
    let fetch = healthy_fetch();
    let service = service(&fetch);

    let first = service.get_short_links().await;
    let second = service.get_short_links().await;
    assert_eq!(first, second);
    assert_eq!(fetch.count("getRecord"), 1);
}

#[tokio::test]
async fn clear_cache_refetches() {
    let fetch = healthy_fetch();
    let service = service(&fetch);

    service.get_short_links().await;
    service.clear_cache();
    service.get_short_links().await;
    assert_eq!(fetch.count("getRecord"), 2);
}

#[tokio::test]
async fn expired_board_is_refetched() {
    let fetch = healthy_fetch();
    let service = service_with(&fetch, Duration::from_millis(1));

    service.get_short_links().await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    service.get_short_links().await;
    assert_eq!(fetch.count("getRecord"), 2);
}

#[tokio::test]
async fn falls_back_to_public_endpoint() {
    let fetch = ScriptedFetch::new()
        .fail("resolver.test")
        .json("public.test", 200, BOARD);
    let service = service(&fetch);

    let links = service.get_short_links().await;
    assert_eq!(links.len(), 3);
    assert_eq!(fetch.count("public.test"), 1);
}

#[tokio::test]
async fn unavailable_board_yields_no_links() {
    let fetch = ScriptedFetch::new()
        .json("resolver.test", 200, MINI_DOC)
        .json("pds.test", 500, "{}")
        .json("public.test", 500, "{}");
    let service = service(&fetch);

    assert!(service.get_short_links().await.is_empty());
    assert!(matches!(
        service.try_short_links().await,
        Err(LinkError::Identity(IdentityError::AllCandidatesFailed { .. }))
    ));
}

#[tokio::test]
async fn failures_are_not_cached() {
    let fetch = ScriptedFetch::new().json("resolver.test", 200, MINI_DOC);
    let service = service(&fetch);

    assert!(service.get_short_links().await.is_empty());

    // clones share their rules, so the service sees the new one
    let _ = fetch.clone().json("pds.test", 200, BOARD);
    assert_eq!(service.get_short_links().await.len(), 3);
}

#[tokio::test]
async fn malformed_board_is_reported() {
    let fetch = ScriptedFetch::new()
        .json("resolver.test", 200, MINI_DOC)
        .json("pds.test", 200, r#"{"uri":"at://x","value":{"links":[]}}"#);
    let service = service(&fetch);

    assert!(matches!(
        service.try_short_links().await,
        Err(LinkError::InvalidBoard { .. })
    ));
}

#[tokio::test]
async fn find_short_link_resolves_generated_codes() {
    let fetch = healthy_fetch();
    let service = service(&fetch);

    let links = service.get_short_links().await;
    for link in &links {
        let found = service.find_short_link(link.shortcode.as_str()).await.unwrap();
        assert_eq!(found.url, link.url);
    }
    assert!(service.find_short_link("-----").await.is_none());
}

#[tokio::test]
async fn codes_match_the_service_encoder() {
    let fetch = healthy_fetch();
    let service = service(&fetch);

    let links = service.get_short_links().await;
    assert_eq!(
        links[0].shortcode,
        service.encode_url("https://github.com/octocat", 6).code
    );
    // same apex, same two-symbol prefix
    assert_eq!(
        &links[0].shortcode.as_str()[..2],
        &links[1].shortcode.as_str()[..2]
    );
    assert!(links.iter().all(|l| service.is_valid_shortcode(l.shortcode.as_str())));
}

#[tokio::test]
async fn encode_url_coerces_short_lengths() {
    let service = service(&ScriptedFetch::new());
    let encoded = service.encode_url("https://github.com/octocat", 1);
    assert_eq!(encoded.code.len(), 6);
    assert!(encoded.length_coerced);
    assert!(!service.is_valid_shortcode(""));
    assert!(!service.is_valid_shortcode("ab_cd"));
}
