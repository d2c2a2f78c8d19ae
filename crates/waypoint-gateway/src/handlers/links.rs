use crate::error::{AppError, Result};
use crate::model::{ApiLink, ApiLinksResponse, HomeLink, HomeResponse, NOT_CONFIGURED_DID};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, warn};

/// Lists the account's links without their targets.
///
/// Always answers 200; problems are reported in the `error` field.
pub async fn index_handler(State(state): State<AppState>) -> Json<HomeResponse> {
    let Some(links) = state.links() else {
        error!("index requested but no account is configured");
        return Json(HomeResponse::failed(
            NOT_CONFIGURED_DID,
            "ATPROTO_DID is not configured. Set it in the environment or pass --did.",
        ));
    };

    match links.short_links().await {
        Ok(records) => Json(HomeResponse {
            did: links.did().to_string(),
            link_count: records.len(),
            links: records.iter().map(HomeLink::from).collect(),
            error: None,
        }),
        Err(e) => {
            error!(error = %e, "failed to load links for index");
            Json(HomeResponse::failed(
                links.did(),
                "Failed to load links. Check the configured DID and network connection.",
            ))
        }
    }
}

pub async fn api_links_handler(State(state): State<AppState>) -> Result<Json<ApiLinksResponse>> {
    let links = state.links().ok_or(AppError::NotConfigured)?;
    let records = links
        .short_links()
        .await
        .map_err(AppError::LinksUnavailable)?;

    Ok(Json(ApiLinksResponse {
        success: true,
        count: records.len(),
        links: records.iter().map(ApiLink::from).collect(),
    }))
}

/// Permanently redirects a short code to its target.
pub async fn redirect_handler(
    Path(shortcode): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    info!(shortcode = %shortcode, "looking up short code");

    let link = match state.links() {
        Some(links) => links.find(&shortcode).await,
        None => None,
    };

    let Some(link) = link else {
        warn!(shortcode = %shortcode, "short code not found");
        return Err(AppError::NotFound(shortcode));
    };

    let location = HeaderValue::try_from(link.url.as_str())
        .map_err(|_| AppError::InvalidTarget(link.url.clone()))?;

    info!(shortcode = %shortcode, target = %link.url, "redirecting");
    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
}
