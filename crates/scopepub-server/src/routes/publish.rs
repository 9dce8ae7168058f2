//! Publish routes

use crate::{
    AppState,
    error::{ApiError, Result},
    models::{ApiResponse, PublishBody, PublishedDetails},
};
use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, StringRejection},
    },
    http::{HeaderMap, header::AUTHORIZATION},
    routing::post,
};
use scopepub_registry::{PackageKind, PublishError, PublishRequest};
use tracing::{debug, info, warn};

const API_KEY_HEADER: &str = "x-api-key";

/// Create publish routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/components/{scope}/{specifier}", post(publish_component))
        .route("/libraries/{scope}/{specifier}", post(publish_library))
        .route("/api/publish", post(publish_structured))
}

/// API key from `x-api-key`, falling back to `Authorization: Bearer <key>`.
/// Blank values count as absent.
fn supplied_api_key(headers: &HeaderMap) -> Option<String> {
    let present = |key: &str| !key.trim().is_empty();

    if let Some(key) = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|key| present(key))
    {
        return Some(key.to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|key| present(key))
        .map(str::to_string)
}

fn source_body(source: std::result::Result<String, StringRejection>) -> Result<String> {
    source.map_err(|rejection| {
        warn!("Unreadable source body: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })
}

/// Publish a component; the body is the raw source
async fn publish_component(
    State(state): State<AppState>,
    Path((scope, specifier)): Path<(String, String)>,
    headers: HeaderMap,
    source: std::result::Result<String, StringRejection>,
) -> Result<Json<ApiResponse<PublishedDetails>>> {
    let source = source_body(source)?;
    let api_key = supplied_api_key(&headers).unwrap_or_default();
    let request = PublishRequest::new(PackageKind::Component, scope, specifier, api_key, source);
    publish(&state, request).await
}

/// Publish a library; the body is the raw source
async fn publish_library(
    State(state): State<AppState>,
    Path((scope, specifier)): Path<(String, String)>,
    headers: HeaderMap,
    source: std::result::Result<String, StringRejection>,
) -> Result<Json<ApiResponse<PublishedDetails>>> {
    let source = source_body(source)?;
    let api_key = supplied_api_key(&headers).unwrap_or_default();
    let request = PublishRequest::new(PackageKind::Library, scope, specifier, api_key, source);
    publish(&state, request).await
}

/// Publish from a JSON payload with separate name and version fields
async fn publish_structured(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Json<PublishBody>, JsonRejection>,
) -> Result<Json<ApiResponse<PublishedDetails>>> {
    let Json(body) = body.map_err(|rejection| {
        warn!("Malformed publish payload: {}", rejection.body_text());
        ApiError::bad_request(rejection.body_text())
    })?;
    let request = body.into_request(supplied_api_key(&headers));
    publish(&state, request).await
}

async fn publish(
    state: &AppState,
    request: PublishRequest,
) -> Result<Json<ApiResponse<PublishedDetails>>> {
    debug!(
        "Publish request: {} {} {:?} ({} bytes)",
        request.kind,
        request.scope,
        request.target,
        request.source.len()
    );

    match state.publisher.publish(request).await {
        Ok(published) => {
            let message = format!("Published {}@{}", published.package, published.version);
            info!("{} ({})", message, published.digest);
            Ok(Json(ApiResponse::with_message(
                PublishedDetails::from(published),
                message,
            )))
        }
        Err(PublishError::Rejected(rejection)) => {
            warn!("Publish rejected ({:?}): {}", rejection.reason(), rejection);
            Err(ApiError::Rejected(rejection))
        }
        Err(err) => Err(err.into()),
    }
}
