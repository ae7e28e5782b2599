use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::constants::tokens::TOKEN_BYTES;
use crate::domain::{TokenKind, UserId};
use crate::entities::{auth_tokens, password_reset_tokens};

/// Bearer tokens and single-use password reset tokens.
pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn issue(&self, user_id: UserId, kind: TokenKind, ttl: Duration) -> Result<String> {
        let token = generate_token();
        let now = Utc::now();

        auth_tokens::ActiveModel {
            user_id: Set(user_id.value()),
            token: Set(token.clone()),
            kind: Set(kind.as_str().to_string()),
            expires_at: Set((now + ttl).to_rfc3339()),
            created_at: Set(now.to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to store auth token")?;

        Ok(token)
    }

    /// Returns the owner of an unexpired token of the given kind.
    /// Expired tokens are deleted on sight.
    pub async fn resolve(&self, token: &str, kind: TokenKind) -> Result<Option<UserId>> {
        let row = auth_tokens::Entity::find()
            .filter(auth_tokens::Column::Token.eq(token))
            .filter(auth_tokens::Column::Kind.eq(kind.as_str()))
            .one(&self.conn)
            .await
            .context("Failed to query auth token")?;

        let Some(row) = row else {
            return Ok(None);
        };

        if is_expired(&row.expires_at) {
            auth_tokens::Entity::delete_by_id(row.id)
                .exec(&self.conn)
                .await
                .context("Failed to delete expired auth token")?;
            return Ok(None);
        }

        Ok(Some(UserId::new(row.user_id)))
    }

    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let result = auth_tokens::Entity::delete_many()
            .filter(auth_tokens::Column::Token.eq(token))
            .exec(&self.conn)
            .await
            .context("Failed to revoke auth token")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn create_reset_token(&self, user_id: UserId, ttl: Duration) -> Result<String> {
        let token = generate_token();
        let now = Utc::now();

        password_reset_tokens::ActiveModel {
            user_id: Set(user_id.value()),
            token: Set(token.clone()),
            expires_at: Set((now + ttl).to_rfc3339()),
            created_at: Set(now.to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to store password reset token")?;

        Ok(token)
    }

    /// Deletes the token and reports whether it was valid for this user.
    pub async fn consume_reset_token(&self, user_id: UserId, token: &str) -> Result<bool> {
        let row = password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::Token.eq(token))
            .filter(password_reset_tokens::Column::UserId.eq(user_id.value()))
            .one(&self.conn)
            .await
            .context("Failed to query password reset token")?;

        let Some(row) = row else {
            return Ok(false);
        };

        let valid = !is_expired(&row.expires_at);

        password_reset_tokens::Entity::delete_by_id(row.id)
            .exec(&self.conn)
            .await
            .context("Failed to delete password reset token")?;

        Ok(valid)
    }

    pub async fn revoke_reset_tokens(&self, user_id: UserId) -> Result<u64> {
        let result = password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::UserId.eq(user_id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to revoke password reset tokens")?;

        Ok(result.rows_affected)
    }
}

/// Unparseable timestamps count as expired.
fn is_expired(expires_at: &str) -> bool {
    DateTime::parse_from_rfc3339(expires_at)
        .map_or(true, |expiry| expiry.with_timezone(&Utc) <= Utc::now())
}

/// Generate a random token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; TOKEN_BYTES] = rng.random();

    bytes
        .iter()
        .fold(String::with_capacity(TOKEN_BYTES * 2), |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        })
}
