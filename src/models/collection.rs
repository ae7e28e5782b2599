use crate::domain::{CollectionId, LinkId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub description: Option<String>,
    /// Member link ids in ascending order.
    pub links: Vec<LinkId>,
    pub created_at: String,
    pub updated_at: String,
}

/// Every writable field of a collection. `links: None` leaves membership
/// untouched on update and means no members on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFields {
    pub name: String,
    pub description: Option<String>,
    pub links: Option<Vec<LinkId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub links: Option<Vec<LinkId>>,
}

impl CollectionPatch {
    #[must_use]
    pub fn apply(self, current: &Collection) -> CollectionFields {
        CollectionFields {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            links: self.links,
        }
    }
}

/// Sorts and removes duplicate ids so membership rows are inserted once.
#[must_use]
pub fn dedup_link_ids(mut ids: Vec<LinkId>) -> Vec<LinkId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
