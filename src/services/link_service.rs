//! Domain service for a user's links.
//!
//! Creation goes through the metadata extractor; edits never do.

use thiserror::Error;

use crate::domain::{LinkId, UserId};
use crate::models::link::{Link, LinkFields, LinkPatch};

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Link {0} not found")]
    NotFound(LinkId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("link with this url already exists.")]
    DuplicateUrl,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for LinkError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::unique_violation(&err).is_some() {
            return Self::DuplicateUrl;
        }
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait LinkService: Send + Sync {
    /// All links owned by `owner`, oldest first.
    async fn list(&self, owner: UserId) -> Result<Vec<Link>, LinkError>;

    async fn get(&self, owner: UserId, id: LinkId) -> Result<Link, LinkError>;

    /// Scrapes `url` and stores the result.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Validation`] for an empty url and
    /// [`LinkError::DuplicateUrl`] if any user already stored it.
    async fn create(&self, owner: UserId, url: &str) -> Result<Link, LinkError>;

    /// Overwrites every writable field.
    async fn replace(&self, owner: UserId, id: LinkId, fields: LinkFields)
    -> Result<Link, LinkError>;

    async fn patch(&self, owner: UserId, id: LinkId, patch: LinkPatch) -> Result<Link, LinkError>;

    /// Deletes the link and drops it from every collection.
    async fn delete(&self, owner: UserId, id: LinkId) -> Result<(), LinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_become_database_errors() {
        let err = LinkError::from(anyhow::anyhow!("disk full").context("Failed to insert link"));
        assert!(matches!(err, LinkError::Database(ref msg) if msg == "Failed to insert link: disk full"));
    }
}
