use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::domain::{LinkId, UserId};
use crate::entities::{collection_links, links};
use crate::models::link::{Link, LinkFields};

impl From<links::Model> for Link {
    fn from(model: links::Model) -> Self {
        Self {
            id: LinkId::new(model.id),
            title: model.title,
            description: model.description,
            url: model.url,
            image: model.image,
            link_type: model.link_type.parse().unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Link storage. Every query is scoped to the owning user.
pub struct LinkRepository {
    conn: DatabaseConnection,
}

impl LinkRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, owner: UserId) -> Result<Vec<Link>> {
        let rows = links::Entity::find()
            .filter(links::Column::UserId.eq(owner.value()))
            .order_by_asc(links::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list links")?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    pub async fn get(&self, owner: UserId, id: LinkId) -> Result<Option<Link>> {
        Ok(self.find_owned(owner, id).await?.map(Link::from))
    }

    /// Inserts a new link. A duplicate url surfaces as the underlying `DbErr`.
    pub async fn insert(&self, owner: UserId, fields: LinkFields) -> Result<Link> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = links::ActiveModel {
            user_id: Set(owner.value()),
            title: Set(fields.title),
            description: Set(fields.description),
            url: Set(fields.url),
            image: Set(fields.image),
            link_type: Set(fields.link_type.as_str().to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(Link::from(model))
    }

    /// Overwrites every writable column. Returns `None` if the link is not
    /// owned by `owner`.
    pub async fn update(&self, owner: UserId, id: LinkId, fields: LinkFields) -> Result<Option<Link>> {
        let Some(existing) = self.find_owned(owner, id).await? else {
            return Ok(None);
        };

        let mut active: links::ActiveModel = existing.into();
        active.title = Set(fields.title);
        active.description = Set(fields.description);
        active.url = Set(fields.url);
        active.image = Set(fields.image);
        active.link_type = Set(fields.link_type.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(Link::from(model)))
    }

    /// Removes the link and its collection memberships.
    pub async fn delete(&self, owner: UserId, id: LinkId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let exists = links::Entity::find_by_id(id.value())
            .filter(links::Column::UserId.eq(owner.value()))
            .one(&txn)
            .await?
            .is_some();

        if !exists {
            return Ok(false);
        }

        collection_links::Entity::delete_many()
            .filter(collection_links::Column::LinkId.eq(id.value()))
            .exec(&txn)
            .await?;

        links::Entity::delete_by_id(id.value()).exec(&txn).await?;

        txn.commit().await.context("Failed to delete link")?;
        Ok(true)
    }

    /// Returns the subset of `ids` that exist and belong to `owner`.
    pub async fn owned_ids(&self, owner: UserId, ids: &[LinkId]) -> Result<Vec<LinkId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = links::Entity::find()
            .select_only()
            .column(links::Column::Id)
            .filter(links::Column::UserId.eq(owner.value()))
            .filter(links::Column::Id.is_in(ids.iter().map(LinkId::value)))
            .into_tuple::<i32>()
            .all(&self.conn)
            .await
            .context("Failed to query owned links")?;

        Ok(rows.into_iter().map(LinkId::new).collect())
    }

    async fn find_owned(&self, owner: UserId, id: LinkId) -> Result<Option<links::Model>> {
        links::Entity::find_by_id(id.value())
            .filter(links::Column::UserId.eq(owner.value()))
            .one(&self.conn)
            .await
            .context("Failed to query link")
    }
}
