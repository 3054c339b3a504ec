use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::error::Result;
use crate::model::{ApiResponse, TitleQuery};
use crate::state::AppState;

/// `GET /api/short-link/v1/title?url=`: the target page's title.
pub async fn title_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<TitleQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<String>>> {
    let Query(query) = query?;
    let url = query.url.unwrap_or_default();
    let metadata = state.metadata().fetch_metadata(&url).await;
    Ok(Json(ApiResponse::success(metadata.title)))
}
