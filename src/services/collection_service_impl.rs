//! `SeaORM` implementation of the `CollectionService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::domain::{CollectionId, LinkId, UserId};
use crate::models::collection::{Collection, CollectionFields, CollectionPatch, dedup_link_ids};
use crate::services::collection_service::{CollectionError, CollectionService};

pub struct SeaOrmCollectionService {
    store: Store,
}

impl SeaOrmCollectionService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Fails on the first id in `links` that the owner does not have.
    async fn check_links(
        &self,
        owner: UserId,
        links: Option<&[LinkId]>,
    ) -> Result<(), CollectionError> {
        let Some(links) = links else {
            return Ok(());
        };
        let wanted = dedup_link_ids(links.to_vec());
        let owned = self.store.owned_link_ids(owner, &wanted).await?;

        match wanted.into_iter().find(|id| !owned.contains(id)) {
            Some(missing) => Err(CollectionError::UnknownLink(missing)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CollectionService for SeaOrmCollectionService {
    async fn list(&self, owner: UserId) -> Result<Vec<Collection>, CollectionError> {
        Ok(self.store.list_collections(owner).await?)
    }

    async fn get(&self, owner: UserId, id: CollectionId) -> Result<Collection, CollectionError> {
        self.store
            .get_collection(owner, id)
            .await?
            .ok_or(CollectionError::NotFound(id))
    }

    async fn create(
        &self,
        owner: UserId,
        fields: CollectionFields,
    ) -> Result<Collection, CollectionError> {
        self.check_links(owner, fields.links.as_deref()).await?;

        let collection = self.store.insert_collection(owner, fields).await?;
        info!(
            collection_id = %collection.id,
            user_id = %owner,
            links = collection.links.len(),
            "Collection created"
        );
        Ok(collection)
    }

    async fn replace(
        &self,
        owner: UserId,
        id: CollectionId,
        fields: CollectionFields,
    ) -> Result<Collection, CollectionError> {
        // Ownership of the collection is checked first so a foreign id is a
        // 404 no matter what the body contains.
        if self.store.get_collection(owner, id).await?.is_none() {
            return Err(CollectionError::NotFound(id));
        }

        self.check_links(owner, fields.links.as_deref()).await?;

        self.store
            .update_collection(owner, id, fields)
            .await?
            .ok_or(CollectionError::NotFound(id))
    }

    async fn patch(
        &self,
        owner: UserId,
        id: CollectionId,
        patch: CollectionPatch,
    ) -> Result<Collection, CollectionError> {
        let current = self.get(owner, id).await?;
        let fields = patch.apply(&current);
        self.replace(owner, id, fields).await
    }

    async fn delete(&self, owner: UserId, id: CollectionId) -> Result<(), CollectionError> {
        if self.store.delete_collection(owner, id).await? {
            info!(collection_id = %id, user_id = %owner, "Collection deleted");
            Ok(())
        } else {
            Err(CollectionError::NotFound(id))
        }
    }
}
