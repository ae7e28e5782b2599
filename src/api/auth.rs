use axum::{
    Json,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::extract::{ApiJson, CurrentUser};
use super::types::{
    AccessTokenResponse, ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    PasswordResetConfirmRequest, PasswordResetRequest, RefreshRequest, RegisterRequest, UserDto,
};
use super::validation::{FieldErrors, REQUIRED};
use super::{ApiError, ApiResponse, AppState};
use crate::constants::session::USER_ID;
use crate::domain::UserId;
use crate::services::AuthError;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                Self::unauthorized(err.to_string())
            }
            AuthError::UserNotFound | AuthError::EmailNotFound => Self::NotFound(err.to_string()),
            AuthError::InvalidResetLink | AuthError::InvalidResetToken => {
                Self::validation(err.to_string())
            }
            AuthError::Field { field, message } => Self::field(field, message),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware that checks:
/// 1. Session cookie (from login)
/// 2. `Authorization: Bearer <access token>` header
/// 3. `X-Api-Key: <access token>` header
///
/// On success the user is stored in the request extensions as [`CurrentUser`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = match session_user_id(&session).await {
        Some(id) => state.auth().get_active_user(id).await?,
        None => None,
    };

    let user = match (user, extract_token(&headers)) {
        (Some(user), _) => Some(user),
        (None, Some(token)) => state.auth().authenticate(&token).await?,
        (None, None) => None,
    };

    let Some(user) = user else {
        return Err(ApiError::unauthorized(
            "Authentication credentials were not provided or are invalid.",
        ));
    };

    tracing::Span::current().record("user_id", user.id.value());
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

async fn session_user_id(session: &Session) -> Option<UserId> {
    match session.get::<i32>(USER_ID).await {
        Ok(id) => id.map(UserId::new),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session");
            None
        }
    }
}

/// Bearer token from the `Authorization` or `X-Api-Key` header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    None
}

fn require_str(value: Option<String>) -> Result<String, String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(REQUIRED.to_string()),
    }
}

fn require(field: &str, value: Option<String>) -> Result<String, ApiError> {
    require_str(value).map_err(|message| ApiError::field(field, message))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageResponse>>), ApiError> {
    let registration = payload.validate()?;
    state.auth().register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MessageResponse::new(
            "User registered successfully.",
        ))),
    ))
}

/// POST /auth/login
/// Verifies credentials, starts a session and returns a token pair.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let mut errors = FieldErrors::default();
    let username = errors.check("username", require_str(payload.username));
    let password = errors.check("password", require_str(payload.password));
    let (Some(username), Some(password)) = (username, password) else {
        return Err(errors.into());
    };

    let result = state.auth().login(&username, &password).await?;

    session
        .insert(USER_ID, result.user.id.value())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        access: result.tokens.access,
        refresh: result.tokens.refresh,
        user: UserDto::from(result.user),
    })))
}

/// POST /auth/token/refresh
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AccessTokenResponse>>, ApiError> {
    let refresh = require("refresh", payload.refresh)?;
    let access = state.auth().refresh(&refresh).await?;
    Ok(Json(ApiResponse::success(AccessTokenResponse { access })))
}

/// POST /auth/logout
/// Ends the session and revokes the presented bearer token, if any.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    session: Session,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_token(&headers) {
        state.auth().logout(&token).await?;
    }

    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session");
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Logged out.",
    ))))
}

/// GET /auth/me
pub async fn get_current_user(user: CurrentUser) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(user.0)))
}

/// POST /auth/change-password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let mut errors = FieldErrors::default();
    let old = errors.check("old_password", require_str(payload.old_password));
    let new = errors.check("new_password", require_str(payload.new_password));
    let (Some(old), Some(new)) = (old, new) else {
        return Err(errors.into());
    };

    state.auth().change_password(user.id(), &old, &new).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password successfully changed.",
    ))))
}

/// POST /auth/password-reset
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<PasswordResetRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let email = require("email", payload.email)?;
    state.auth().request_password_reset(&email).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password reset link sent to your email.",
    ))))
}

/// POST /auth/reset-password/{uid}/{token}
pub async fn confirm_password_reset(
    State(state): State<Arc<AppState>>,
    Path((uid, token)): Path<(String, String)>,
    ApiJson(payload): ApiJson<PasswordResetConfirmRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let new_password = require("new_password", payload.new_password)?;
    state
        .auth()
        .confirm_password_reset(&uid, &token, &new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password successfully reset.",
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc "));
        headers.insert("X-Api-Key", HeaderValue::from_static("def"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn api_key_header_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Key", HeaderValue::from_static("def"));
        assert_eq!(extract_token(&headers).as_deref(), Some("def"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(extract_token(&headers), None);
    }
}
