//! `SeaORM` implementation of the `LinkService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::clients::MetadataExtractor;
use crate::constants::limits::MAX_TITLE_LENGTH;
use crate::db::Store;
use crate::domain::{LinkId, UserId};
use crate::models::link::{Link, LinkFields, LinkPatch};
use crate::services::link_service::{LinkError, LinkService};

pub struct SeaOrmLinkService {
    store: Store,
    extractor: Arc<dyn MetadataExtractor>,
}

impl SeaOrmLinkService {
    #[must_use]
    pub fn new(store: Store, extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self { store, extractor }
    }
}

#[async_trait]
impl LinkService for SeaOrmLinkService {
    async fn list(&self, owner: UserId) -> Result<Vec<Link>, LinkError> {
        Ok(self.store.list_links(owner).await?)
    }

    async fn get(&self, owner: UserId, id: LinkId) -> Result<Link, LinkError> {
        self.store
            .get_link(owner, id)
            .await?
            .ok_or(LinkError::NotFound(id))
    }

    async fn create(&self, owner: UserId, url: &str) -> Result<Link, LinkError> {
        if url.is_empty() {
            return Err(LinkError::Validation("URL is required.".to_string()));
        }

        let meta = self.extractor.extract(url).await;

        let fields = LinkFields {
            title: truncate_chars(meta.title, MAX_TITLE_LENGTH),
            description: Some(meta.description),
            url: meta.url,
            image: Some(meta.image),
            link_type: meta.link_type,
        };

        let link = self.store.insert_link(owner, fields).await?;
        info!(link_id = %link.id, user_id = %owner, url = %link.url, "Link created");
        Ok(link)
    }

    async fn replace(
        &self,
        owner: UserId,
        id: LinkId,
        fields: LinkFields,
    ) -> Result<Link, LinkError> {
        self.store
            .update_link(owner, id, fields)
            .await?
            .ok_or(LinkError::NotFound(id))
    }

    async fn patch(&self, owner: UserId, id: LinkId, patch: LinkPatch) -> Result<Link, LinkError> {
        let current = self.get(owner, id).await?;
        let fields = patch.apply(&current);
        self.replace(owner, id, fields).await
    }

    async fn delete(&self, owner: UserId, id: LinkId) -> Result<(), LinkError> {
        if self.store.delete_link(owner, id).await? {
            info!(link_id = %id, user_id = %owner, "Link deleted");
            Ok(())
        } else {
            Err(LinkError::NotFound(id))
        }
    }
}

/// Scraped titles can be arbitrarily long; stored titles cannot.
fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}
