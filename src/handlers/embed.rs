use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::OgpData;
use crate::state::AppState;

pub const MISSING_URL_MESSAGE: &str = "Please provide a URL query parameter.";

#[derive(Debug, Deserialize)]
pub struct EmbedQuery {
    pub url: Option<String>,
}

/// GET /embed?url=<encoded-url>
///
/// Returns Open Graph metadata for the given URL, cached per raw URL string.
/// A page without an image or favicon is a normal result, not an error.
pub async fn get_embed(
    State(state): State<AppState>,
    Query(params): Query<EmbedQuery>,
) -> AppResult<Json<OgpData>> {
    let url = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation(MISSING_URL_MESSAGE.into()))?;

    let ogp = state.ogp.clone();
    let data = state
        .extract_pool
        .spawn_pinned(move || async move { ogp.get_cached_ogp(&url).await })
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Extraction task failed");
            AppError::Internal
        })??;

    Ok(Json(data))
}
