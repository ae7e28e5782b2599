use crate::domain::{LinkId, LinkType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image: Option<String>,
    pub link_type: LinkType,
    pub created_at: String,
    pub updated_at: String,
}

/// Every writable column of a link. Used both for inserts and full replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFields {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image: Option<String>,
    pub link_type: LinkType,
}

/// A partial update; `None` leaves the column as it is.
///
/// Nullable columns use a nested option so that an explicit `null` can clear
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub url: Option<String>,
    pub image: Option<Option<String>>,
    pub link_type: Option<LinkType>,
}

impl LinkPatch {
    #[must_use]
    pub fn apply(self, current: &Link) -> LinkFields {
        LinkFields {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            url: self.url.unwrap_or_else(|| current.url.clone()),
            image: self.image.unwrap_or_else(|| current.image.clone()),
            link_type: self.link_type.unwrap_or(current.link_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Link {
        Link {
            id: LinkId::new(1),
            title: "Rust".to_string(),
            description: Some("systems language".to_string()),
            url: "https://www.rust-lang.org/".to_string(),
            image: Some("https://www.rust-lang.org/logo.png".to_string()),
            link_type: LinkType::Website,
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
            updated_at: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn empty_patch_keeps_everything() {
        let link = sample();
        let fields = LinkPatch::default().apply(&link);
        assert_eq!(fields.title, link.title);
        assert_eq!(fields.description, link.description);
        assert_eq!(fields.url, link.url);
        assert_eq!(fields.image, link.image);
        assert_eq!(fields.link_type, link.link_type);
    }

    #[test]
    fn patch_can_clear_nullable_columns() {
        let patch = LinkPatch {
            description: Some(None),
            link_type: Some(LinkType::Article),
            ..LinkPatch::default()
        };
        let fields = patch.apply(&sample());
        assert_eq!(fields.description, None);
        assert_eq!(fields.image.as_deref(), Some("https://www.rust-lang.org/logo.png"));
        assert_eq!(fields.link_type, LinkType::Article);
    }
}
