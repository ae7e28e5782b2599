//! Domain service for accounts and credentials.
//!
//! Handles registration, login, bearer tokens, password changes and the
//! emailed password reset flow.

use serde::Serialize;
use thiserror::Error;

use crate::domain::UserId;
use crate::models::user::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("User with this email does not exist.")]
    EmailNotFound,

    #[error("Invalid link.")]
    InvalidResetLink,

    #[error("Invalid or expired token.")]
    InvalidResetToken,

    /// A problem tied to one request field.
    #[error("{field}: {message}")]
    Field {
        field: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Field {
            field,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a regular account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Field`] for a taken username or email or a
    /// password that is too short.
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;

    /// Verifies credentials and issues an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails or the
    /// account is inactive.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Exchanges a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError>;

    /// Revokes a bearer token. Unknown tokens are ignored.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// Resolves an access token to an active user.
    async fn authenticate(&self, access_token: &str) -> Result<Option<User>, AuthError>;

    /// Loads an active user by id, as stored in the session.
    async fn get_active_user(&self, id: UserId) -> Result<Option<User>, AuthError>;

    /// Changes a user's password after checking the old one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Field`] if the old password is wrong or the new
    /// one is invalid.
    async fn change_password(
        &self,
        id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Stores a reset token and mails the reset link.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailNotFound`] if no account uses `email`.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Sets a new password using a mailed reset link. Tokens are single use.
    async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
