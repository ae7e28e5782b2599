use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, CurrentUser};
use super::types::{CreateLinkRequest, LinkDto, PatchLinkRequest, ReplaceLinkRequest};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::LinkId;
use crate::services::LinkError;

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::NotFound(id) => Self::not_found("Link", id),
            LinkError::Validation(msg) => Self::validation(msg),
            LinkError::DuplicateUrl => Self::field("url", err.to_string()),
            LinkError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// GET /links
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<LinkDto>>>, ApiError> {
    let links = state.links().list(user.id()).await?;
    Ok(Json(ApiResponse::success(
        links.into_iter().map(LinkDto::from).collect(),
    )))
}

/// POST /links
/// Scrapes the page behind `url` and stores it. Fetch failures still
/// create the link, with empty metadata.
pub async fn create_link(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<CreateLinkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LinkDto>>), ApiError> {
    let url = payload.validate()?;
    let link = state.links().create(user.id(), &url).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(LinkDto::from(link))),
    ))
}

/// GET /links/{id}
pub async fn get_link(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<LinkDto>>, ApiError> {
    let link = state.links().get(user.id(), LinkId::new(id)).await?;
    Ok(Json(ApiResponse::success(LinkDto::from(link))))
}

/// PUT /links/{id}
pub async fn replace_link(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<ReplaceLinkRequest>,
) -> Result<Json<ApiResponse<LinkDto>>, ApiError> {
    let id = LinkId::new(id);
    // A foreign or missing id is reported before any body problem.
    state.links().get(user.id(), id).await?;

    let patch = payload.validate()?;
    let link = state.links().patch(user.id(), id, patch).await?;
    Ok(Json(ApiResponse::success(LinkDto::from(link))))
}

/// PATCH /links/{id}
pub async fn patch_link(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<PatchLinkRequest>,
) -> Result<Json<ApiResponse<LinkDto>>, ApiError> {
    let id = LinkId::new(id);
    state.links().get(user.id(), id).await?;

    let patch = payload.validate()?;
    let link = state.links().patch(user.id(), id, patch).await?;
    Ok(Json(ApiResponse::success(LinkDto::from(link))))
}

/// DELETE /links/{id}
pub async fn delete_link(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.links().delete(user.id(), LinkId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
