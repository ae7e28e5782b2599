use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::domain::{CollectionId, LinkId, UserId};
use crate::entities::{collection_links, collections};
use crate::models::collection::{Collection, CollectionFields, dedup_link_ids};

fn to_collection(model: collections::Model, links: Vec<LinkId>) -> Collection {
    Collection {
        id: CollectionId::new(model.id),
        name: model.name,
        description: model.description,
        links,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Collections and their link membership, scoped to the owning user.
///
/// Link ownership is checked by the service before membership is written;
/// this layer only stores what it is given.
pub struct CollectionRepository {
    conn: DatabaseConnection,
}

impl CollectionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, owner: UserId) -> Result<Vec<Collection>> {
        let rows = collections::Entity::find()
            .filter(collections::Column::UserId.eq(owner.value()))
            .order_by_asc(collections::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list collections")?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|c| c.id).collect();
        let memberships = collection_links::Entity::find()
            .filter(collection_links::Column::CollectionId.is_in(ids))
            .order_by_asc(collection_links::Column::LinkId)
            .all(&self.conn)
            .await
            .context("Failed to load collection membership")?;

        let mut by_collection: HashMap<i32, Vec<LinkId>> = HashMap::new();
        for m in memberships {
            by_collection
                .entry(m.collection_id)
                .or_default()
                .push(LinkId::new(m.link_id));
        }

        Ok(rows
            .into_iter()
            .map(|c| {
                let links = by_collection.remove(&c.id).unwrap_or_default();
                to_collection(c, links)
            })
            .collect())
    }

    pub async fn get(&self, owner: UserId, id: CollectionId) -> Result<Option<Collection>> {
        let Some(model) = find_owned(&self.conn, owner, id).await? else {
            return Ok(None);
        };

        let links = member_ids(&self.conn, model.id).await?;
        Ok(Some(to_collection(model, links)))
    }

    pub async fn insert(&self, owner: UserId, fields: CollectionFields) -> Result<Collection> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let model = collections::ActiveModel {
            user_id: Set(owner.value()),
            name: Set(fields.name),
            description: Set(fields.description),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert collection")?;

        let links = dedup_link_ids(fields.links.unwrap_or_default());
        insert_members(&txn, model.id, &links).await?;

        txn.commit().await?;
        Ok(to_collection(model, links))
    }

    /// Overwrites name and description in one transaction. Membership is
    /// rewritten only when `fields.links` is set.
    pub async fn update(
        &self,
        owner: UserId,
        id: CollectionId,
        fields: CollectionFields,
    ) -> Result<Option<Collection>> {
        let txn = self.conn.begin().await?;

        let Some(existing) = find_owned(&txn, owner, id).await? else {
            return Ok(None);
        };

        let mut active: collections::ActiveModel = existing.into();
        active.name = Set(fields.name);
        active.description = Set(fields.description);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let model = active
            .update(&txn)
            .await
            .context("Failed to update collection")?;

        let links = match fields.links {
            Some(links) => {
                collection_links::Entity::delete_many()
                    .filter(collection_links::Column::CollectionId.eq(model.id))
                    .exec(&txn)
                    .await?;

                let links = dedup_link_ids(links);
                insert_members(&txn, model.id, &links).await?;
                links
            }
            None => member_ids(&txn, model.id).await?,
        };

        txn.commit().await?;
        Ok(Some(to_collection(model, links)))
    }

    /// Removes the collection and its membership rows. Links are untouched.
    pub async fn delete(&self, owner: UserId, id: CollectionId) -> Result<bool> {
        let txn = self.conn.begin().await?;

        if find_owned(&txn, owner, id).await?.is_none() {
            return Ok(false);
        }

        collection_links::Entity::delete_many()
            .filter(collection_links::Column::CollectionId.eq(id.value()))
            .exec(&txn)
            .await?;

        collections::Entity::delete_by_id(id.value())
            .exec(&txn)
            .await?;

        txn.commit().await.context("Failed to delete collection")?;
        Ok(true)
    }
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    id: CollectionId,
) -> Result<Option<collections::Model>> {
    collections::Entity::find_by_id(id.value())
        .filter(collections::Column::UserId.eq(owner.value()))
        .one(conn)
        .await
        .context("Failed to query collection")
}

async fn member_ids<C: ConnectionTrait>(conn: &C, collection_id: i32) -> Result<Vec<LinkId>> {
    let rows = collection_links::Entity::find()
        .filter(collection_links::Column::CollectionId.eq(collection_id))
        .order_by_asc(collection_links::Column::LinkId)
        .all(conn)
        .await
        .context("Failed to load collection membership")?;

    Ok(rows.into_iter().map(|m| LinkId::new(m.link_id)).collect())
}

async fn insert_members<C: ConnectionTrait>(
    conn: &C,
    collection_id: i32,
    links: &[LinkId],
) -> Result<()> {
    if links.is_empty() {
        return Ok(());
    }

    let rows: Vec<collection_links::ActiveModel> = links
        .iter()
        .map(|link| collection_links::ActiveModel {
            collection_id: Set(collection_id),
            link_id: Set(link.value()),
        })
        .collect();

    collection_links::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await
        .context("Failed to insert collection membership")?;

    Ok(())
}
