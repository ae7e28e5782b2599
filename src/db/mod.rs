use anyhow::Result;
use chrono::Duration as TokenTtl;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::{CollectionId, LinkId, TokenKind, UserId};
use crate::models::collection::{Collection, CollectionFields};
use crate::models::link::{Link, LinkFields};
use crate::models::user::{NewUser, User};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        if !path_str.starts_with(":memory:") {
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn link_repo(&self) -> repositories::link::LinkRepository {
        repositories::link::LinkRepository::new(self.conn.clone())
    }

    fn collection_repo(&self) -> repositories::collection::CollectionRepository {
        repositories::collection::CollectionRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, new_user: NewUser, security: &SecurityConfig) -> Result<User> {
        self.user_repo().create(new_user, security).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_password_for(&self, id: UserId, password: &str) -> Result<bool> {
        self.user_repo().verify_password_by_id(id, password).await
    }

    pub async fn update_user_password(
        &self,
        id: UserId,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, security)
            .await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // Tokens

    pub async fn issue_token(&self, user_id: UserId, kind: TokenKind, ttl: TokenTtl) -> Result<String> {
        self.token_repo().issue(user_id, kind, ttl).await
    }

    pub async fn resolve_token(&self, token: &str, kind: TokenKind) -> Result<Option<UserId>> {
        self.token_repo().resolve(token, kind).await
    }

    pub async fn revoke_token(&self, token: &str) -> Result<bool> {
        self.token_repo().revoke(token).await
    }

    pub async fn create_reset_token(&self, user_id: UserId, ttl: TokenTtl) -> Result<String> {
        self.token_repo().create_reset_token(user_id, ttl).await
    }

    pub async fn consume_reset_token(&self, user_id: UserId, token: &str) -> Result<bool> {
        self.token_repo().consume_reset_token(user_id, token).await
    }

    pub async fn revoke_reset_tokens(&self, user_id: UserId) -> Result<u64> {
        self.token_repo().revoke_reset_tokens(user_id).await
    }

    // Links

    pub async fn list_links(&self, owner: UserId) -> Result<Vec<Link>> {
        self.link_repo().list(owner).await
    }

    pub async fn get_link(&self, owner: UserId, id: LinkId) -> Result<Option<Link>> {
        self.link_repo().get(owner, id).await
    }

    pub async fn insert_link(&self, owner: UserId, fields: LinkFields) -> Result<Link> {
        self.link_repo().insert(owner, fields).await
    }

    pub async fn update_link(
        &self,
        owner: UserId,
        id: LinkId,
        fields: LinkFields,
    ) -> Result<Option<Link>> {
        self.link_repo().update(owner, id, fields).await
    }

    pub async fn delete_link(&self, owner: UserId, id: LinkId) -> Result<bool> {
        self.link_repo().delete(owner, id).await
    }

    pub async fn owned_link_ids(&self, owner: UserId, ids: &[LinkId]) -> Result<Vec<LinkId>> {
        self.link_repo().owned_ids(owner, ids).await
    }

    // Collections

    pub async fn list_collections(&self, owner: UserId) -> Result<Vec<Collection>> {
        self.collection_repo().list(owner).await
    }

    pub async fn get_collection(&self, owner: UserId, id: CollectionId) -> Result<Option<Collection>> {
        self.collection_repo().get(owner, id).await
    }

    pub async fn insert_collection(
        &self,
        owner: UserId,
        fields: CollectionFields,
    ) -> Result<Collection> {
        self.collection_repo().insert(owner, fields).await
    }

    pub async fn update_collection(
        &self,
        owner: UserId,
        id: CollectionId,
        fields: CollectionFields,
    ) -> Result<Option<Collection>> {
        self.collection_repo().update(owner, id, fields).await
    }

    pub async fn delete_collection(&self, owner: UserId, id: CollectionId) -> Result<bool> {
        self.collection_repo().delete(owner, id).await
    }
}

/// Returns the constraint message if `err` wraps a unique constraint violation.
#[must_use]
pub fn unique_violation(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DbErr>())
        .and_then(DbErr::sql_err)
        .and_then(|sql_err| match sql_err {
            SqlErr::UniqueConstraintViolation(msg) => Some(msg),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1).await.unwrap()
    }

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_reported_as_unique_violation() {
        let store = memory_store().await;
        let security = fast_security();

        store
            .create_user(
                NewUser::regular("alice".into(), "a@example.com".into(), "password1".into()),
                &security,
            )
            .await
            .unwrap();

        let err = store
            .create_user(
                NewUser::regular("alice".into(), "b@example.com".into(), "password1".into()),
                &security,
            )
            .await
            .unwrap_err();

        assert!(unique_violation(&err).is_some());
    }

    #[tokio::test]
    async fn other_errors_are_not_unique_violations() {
        let err = anyhow::anyhow!("boom");
        assert!(unique_violation(&err).is_none());
    }

    #[tokio::test]
    async fn deleting_a_link_drops_its_memberships() {
        let store = memory_store().await;
        let user = store
            .create_user(
                NewUser::regular("bob".into(), "bob@example.com".into(), "password1".into()),
                &fast_security(),
            )
            .await
            .unwrap();

        let link = store
            .insert_link(
                user.id,
                LinkFields {
                    title: "Example".into(),
                    description: None,
                    url: "https://example.com/".into(),
                    image: Some(String::new()),
                    link_type: crate::domain::LinkType::Website,
                },
            )
            .await
            .unwrap();

        let collection = store
            .insert_collection(
                user.id,
                CollectionFields {
                    name: "Reading".into(),
                    description: None,
                    links: Some(vec![link.id, link.id]),
                },
            )
            .await
            .unwrap();
        assert_eq!(collection.links, vec![link.id]);

        assert!(store.delete_link(user.id, link.id).await.unwrap());

        let reloaded = store
            .get_collection(user.id, collection.id)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.links.is_empty());
    }

    #[tokio::test]
    async fn updating_without_links_keeps_memberships() {
        let store = memory_store().await;
        let user = store
            .create_user(
                NewUser::regular("carol".into(), "carol@example.com".into(), "password1".into()),
                &fast_security(),
            )
            .await
            .unwrap();

        let link = store
            .insert_link(
                user.id,
                LinkFields {
                    title: "Example".into(),
                    description: None,
                    url: "https://example.org/".into(),
                    image: None,
                    link_type: crate::domain::LinkType::Website,
                },
            )
            .await
            .unwrap();

        let collection = store
            .insert_collection(
                user.id,
                CollectionFields {
                    name: "Reading".into(),
                    description: None,
                    links: Some(vec![link.id]),
                },
            )
            .await
            .unwrap();

        let updated = store
            .update_collection(
                user.id,
                collection.id,
                CollectionFields {
                    name: "Renamed".into(),
                    description: Some("later".into()),
                    links: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.links, vec![link.id]);

        let cleared = store
            .update_collection(
                user.id,
                collection.id,
                CollectionFields {
                    name: "Renamed".into(),
                    description: None,
                    links: Some(Vec::new()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(cleared.links.is_empty());
    }
}
