use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, CurrentUser};
use super::types::{CollectionDto, CollectionRequest, PatchCollectionRequest};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::CollectionId;
use crate::services::CollectionError;

impl From<CollectionError> for ApiError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::NotFound(id) => Self::not_found("Collection", id),
            CollectionError::UnknownLink(_) => Self::field("links", err.to_string()),
            CollectionError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// GET /collections
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<CollectionDto>>>, ApiError> {
    let collections = state.collections().list(user.id()).await?;
    Ok(Json(ApiResponse::success(
        collections.into_iter().map(CollectionDto::from).collect(),
    )))
}

/// POST /collections
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<CollectionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CollectionDto>>), ApiError> {
    let fields = payload.validate()?;
    let collection = state.collections().create(user.id(), fields).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CollectionDto::from(collection))),
    ))
}

/// GET /collections/{id}
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CollectionDto>>, ApiError> {
    let collection = state
        .collections()
        .get(user.id(), CollectionId::new(id))
        .await?;
    Ok(Json(ApiResponse::success(CollectionDto::from(collection))))
}

/// PUT /collections/{id}
pub async fn replace_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<CollectionRequest>,
) -> Result<Json<ApiResponse<CollectionDto>>, ApiError> {
    let id = CollectionId::new(id);
    state.collections().get(user.id(), id).await?;

    let patch = payload.validate_replace()?;
    let collection = state.collections().patch(user.id(), id, patch).await?;
    Ok(Json(ApiResponse::success(CollectionDto::from(collection))))
}

/// PATCH /collections/{id}
pub async fn patch_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<PatchCollectionRequest>,
) -> Result<Json<ApiResponse<CollectionDto>>, ApiError> {
    let id = CollectionId::new(id);
    state.collections().get(user.id(), id).await?;

    let patch = payload.validate()?;
    let collection = state.collections().patch(user.id(), id, patch).await?;
    Ok(Json(ApiResponse::success(CollectionDto::from(collection))))
}

/// DELETE /collections/{id}
pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state
        .collections()
        .delete(user.id(), CollectionId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
