//! Domain service for collections of links.

use thiserror::Error;

use crate::domain::{CollectionId, LinkId, UserId};
use crate::models::collection::{Collection, CollectionFields, CollectionPatch};

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Collection {0} not found")]
    NotFound(CollectionId),

    /// A referenced link is missing or belongs to someone else.
    #[error("Invalid pk \"{0}\" - object does not exist.")]
    UnknownLink(LinkId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for CollectionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait CollectionService: Send + Sync {
    async fn list(&self, owner: UserId) -> Result<Vec<Collection>, CollectionError>;

    async fn get(&self, owner: UserId, id: CollectionId) -> Result<Collection, CollectionError>;

    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownLink`] if any member id is not one
    /// of the owner's links. Nothing is written in that case.
    async fn create(
        &self,
        owner: UserId,
        fields: CollectionFields,
    ) -> Result<Collection, CollectionError>;

    async fn replace(
        &self,
        owner: UserId,
        id: CollectionId,
        fields: CollectionFields,
    ) -> Result<Collection, CollectionError>;

    async fn patch(
        &self,
        owner: UserId,
        id: CollectionId,
        patch: CollectionPatch,
    ) -> Result<Collection, CollectionError>;

    /// Deletes the collection; member links are kept.
    async fn delete(&self, owner: UserId, id: CollectionId) -> Result<(), CollectionError>;
}
