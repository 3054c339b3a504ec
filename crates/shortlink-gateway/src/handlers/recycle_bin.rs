use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use shortlink_core::{LinkKey, Page, PageRequest};
use shortlink_recycle_bin::{RecycleBinEntry, Transition};

use crate::error::{AppError, Result};
use crate::model::{ApiResponse, PageRecycleBinQuery, RecycleBinRequest, TransitionResponse};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 10;

fn link_key(request: RecycleBinRequest) -> Result<LinkKey> {
    let gid = request.gid.trim();
    let full_short_url = request.full_short_url.trim();
    if gid.is_empty() || full_short_url.is_empty() {
        return Err(AppError::BadRequest(
            "gid and fullShortUrl are required".to_string(),
        ));
    }
    Ok(LinkKey::new(gid, full_short_url))
}

fn respond(transition: Transition) -> Json<ApiResponse<TransitionResponse>> {
    Json(ApiResponse::success(TransitionResponse {
        applied: transition.is_applied(),
    }))
}

pub async fn save_recycle_bin_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<RecycleBinRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TransitionResponse>>> {
    let Json(request) = request?;
    let key = link_key(request)?;
    let transition = state.recycle_bin().save_recycle_bin(&key).await?;
    Ok(respond(transition))
}

pub async fn recover_recycle_bin_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<RecycleBinRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TransitionResponse>>> {
    let Json(request) = request?;
    let key = link_key(request)?;
    let transition = state.recycle_bin().recover_recycle_bin(&key).await?;
    Ok(respond(transition))
}

pub async fn remove_recycle_bin_handler(
    State(state): State<AppState>,
    request: std::result::Result<Json<RecycleBinRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TransitionResponse>>> {
    let Json(request) = request?;
    let key = link_key(request)?;
    let transition = state.recycle_bin().remove_recycle_bin(&key).await?;
    Ok(respond(transition))
}

pub async fn page_recycle_bin_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<PageRecycleBinQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Page<RecycleBinEntry>>>> {
    let Query(query) = query?;
    let gid = query
        .gid
        .as_deref()
        .map(str::trim)
        .filter(|gid| !gid.is_empty())
        .ok_or_else(|| AppError::BadRequest("gid is required".to_string()))?;

    let page = PageRequest::new(
        query.current.unwrap_or(1),
        query.size.unwrap_or(DEFAULT_PAGE_SIZE),
    );
    let page = state.recycle_bin().page_recycle_bin(gid, page).await?;
    Ok(Json(ApiResponse::success(page)))
}
