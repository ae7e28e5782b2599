//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tracing::{info, warn};

use crate::config::{PasswordResetConfig, SecurityConfig};
use crate::db::{Store, unique_violation};
use crate::domain::{TokenKind, UserId};
use crate::models::user::{NewUser, User, normalize_email};
use crate::services::auth_service::{
    AuthError, AuthService, LoginResult, Registration, TokenPair,
};
use crate::services::mailer::{MailMessage, Mailer};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    password_reset: PasswordResetConfig,
    mailer: Arc<dyn Mailer>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        security: SecurityConfig,
        password_reset: PasswordResetConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            security,
            password_reset,
            mailer,
        }
    }

    fn check_password_length(&self, field: &'static str, password: &str) -> Result<(), AuthError> {
        let min = self.security.min_password_length;
        if password.chars().count() < min {
            return Err(AuthError::field(
                field,
                format!("This password is too short. It must contain at least {min} characters."),
            ));
        }
        Ok(())
    }

    async fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let access = self
            .store
            .issue_token(
                user_id,
                TokenKind::Access,
                Duration::minutes(self.security.access_token_ttl_minutes),
            )
            .await?;
        let refresh = self
            .store
            .issue_token(
                user_id,
                TokenKind::Refresh,
                Duration::days(self.security.refresh_token_ttl_days),
            )
            .await?;

        Ok(TokenPair { access, refresh })
    }

    async fn active_user(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.store.get_user(id).await?.filter(|u| u.is_active))
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let email = normalize_email(&registration.email);
        self.check_password_length("password", &registration.password)?;

        if self
            .store
            .get_user_by_username(&registration.username)
            .await?
            .is_some()
        {
            return Err(AuthError::field(
                "username",
                "A user with that username already exists.",
            ));
        }

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::field("email", "user with this email already exists."));
        }

        let new_user = NewUser::regular(registration.username, email, registration.password);
        let user = self
            .store
            .create_user(new_user, &self.security)
            .await
            .map_err(|e| match unique_violation(&e) {
                // Lost a race with a concurrent registration.
                Some(msg) if msg.contains("email") => {
                    AuthError::field("email", "user with this email already exists.")
                }
                Some(_) => {
                    AuthError::field("username", "A user with that username already exists.")
                }
                None => AuthError::from(e),
            })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .filter(|u| u.is_active);

        let Some(user) = user else {
            warn!(username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let tokens = self.issue_pair(user.id).await?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResult { user, tokens })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user_id = self
            .store
            .resolve_token(refresh_token, TokenKind::Refresh)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if self.active_user(user_id).await?.is_none() {
            return Err(AuthError::InvalidToken);
        }

        Ok(self
            .store
            .issue_token(
                user_id,
                TokenKind::Access,
                Duration::minutes(self.security.access_token_ttl_minutes),
            )
            .await?)
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.revoke_token(token).await?;
        Ok(())
    }

    async fn authenticate(&self, access_token: &str) -> Result<Option<User>, AuthError> {
        match self
            .store
            .resolve_token(access_token, TokenKind::Access)
            .await?
        {
            Some(user_id) => self.active_user(user_id).await,
            None => Ok(None),
        }
    }

    async fn get_active_user(&self, id: UserId) -> Result<Option<User>, AuthError> {
        self.active_user(id).await
    }

    async fn change_password(
        &self,
        id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if !self.store.verify_password_for(id, old_password).await? {
            return Err(AuthError::field("old_password", "Old password is incorrect."));
        }

        self.check_password_length("new_password", new_password)?;

        self.store
            .update_user_password(id, new_password, &self.security)
            .await?;
        self.store.revoke_reset_tokens(id).await?;

        info!(user_id = %id, "Password changed");
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let user = self
            .store
            .get_user_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::EmailNotFound)?;

        let token = self
            .store
            .create_reset_token(
                user.id,
                Duration::hours(self.password_reset.token_ttl_hours),
            )
            .await?;

        let reset_url = format!(
            "{}/{}/{}/",
            self.password_reset.reset_url_base.trim_end_matches('/'),
            user.id,
            token
        );

        self.mailer
            .send(MailMessage {
                from: self.password_reset.from_address.clone(),
                to: user.email.clone(),
                subject: "Password Reset Request".to_string(),
                body: format!("Click the link to reset your password: {reset_url}"),
            })
            .await?;

        info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.check_password_length("new_password", new_password)?;

        let user_id = uid
            .parse::<i32>()
            .map(UserId::new)
            .map_err(|_| AuthError::InvalidResetLink)?;

        if self.active_user(user_id).await?.is_none() {
            return Err(AuthError::InvalidResetLink);
        }

        if !self.store.consume_reset_token(user_id, token).await? {
            return Err(AuthError::InvalidResetToken);
        }

        self.store
            .update_user_password(user_id, new_password, &self.security)
            .await?;
        self.store.revoke_reset_tokens(user_id).await?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }
}
