use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::domain::{CollectionId, LinkId, LinkType, UserId};
use crate::models::collection::{Collection, CollectionFields, CollectionPatch};
use crate::models::link::{Link, LinkPatch};
use crate::models::user::User;

use super::validation::{
    FieldErrors, REQUIRED, validate_email, validate_image, validate_link_type, validate_name,
    validate_required, validate_title, validate_url, validate_username,
};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            errors: None,
        }
    }

    pub fn field_errors(message: impl Into<String>, errors: BTreeMap<String, String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            errors: Some(errors),
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`). Use with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct LinkDto {
    pub id: LinkId,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub image: Option<String>,
    pub link_type: LinkType,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Link> for LinkDto {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            title: link.title,
            description: link.description,
            url: link.url,
            image: link.image,
            link_type: link.link_type,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CollectionDto {
    pub id: CollectionId,
    pub name: String,
    pub description: Option<String>,
    pub links: Vec<LinkId>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Collection> for CollectionDto {
    fn from(collection: Collection) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            description: collection.description,
            links: collection.links,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

// ============================================================================
// Auth requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<crate::services::Registration, FieldErrors> {
        let mut errors = FieldErrors::default();

        let username = errors.check(
            "username",
            validate_required(self.username).and_then(validate_username),
        );
        let email = errors.check(
            "email",
            validate_required(self.email).and_then(validate_email),
        );
        let password = errors.check("password", validate_required(self.password));

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => {
                Ok(crate::services::Registration {
                    username,
                    email,
                    password,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub new_password: Option<String>,
}

// ============================================================================
// Link requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub url: Option<String>,
}

impl CreateLinkRequest {
    /// Only presence is checked; the extractor takes any string.
    pub fn validate(self) -> Result<String, FieldErrors> {
        match self.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => {
                let mut errors = FieldErrors::default();
                errors.add("url", "URL is required.");
                Err(errors)
            }
        }
    }
}

/// Body of `PUT /links/{id}`. `title` and `url` are required; omitted
/// optional fields keep their stored values and `null` clears them.
#[derive(Debug, Deserialize)]
pub struct ReplaceLinkRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    pub link_type: Option<String>,
}

impl ReplaceLinkRequest {
    pub fn validate(self) -> Result<LinkPatch, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = errors.check("title", required(self.title).and_then(validate_title));
        let url = errors.check("url", required(self.url).and_then(validate_url));
        let image = self
            .image
            .and_then(|i| errors.check("image", validate_image(i)));
        let link_type = self
            .link_type
            .and_then(|t| errors.check("link_type", validate_link_type(&t)));

        errors.into_result()?;

        Ok(LinkPatch {
            title,
            description: self.description,
            url,
            image,
            link_type,
        })
    }
}

/// Body of `PATCH /links/{id}`. Only supplied fields are validated.
#[derive(Debug, Default, Deserialize)]
pub struct PatchLinkRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    pub link_type: Option<String>,
}

impl PatchLinkRequest {
    pub fn validate(self) -> Result<LinkPatch, FieldErrors> {
        let mut errors = FieldErrors::default();

        let title = self
            .title
            .and_then(|t| errors.check("title", validate_title(t)));
        let url = self.url.and_then(|u| errors.check("url", validate_url(u)));
        let image = self
            .image
            .and_then(|i| errors.check("image", validate_image(i)));
        let link_type = self
            .link_type
            .and_then(|t| errors.check("link_type", validate_link_type(&t)));

        errors.into_result()?;

        Ok(LinkPatch {
            title,
            description: self.description,
            url,
            image,
            link_type,
        })
    }
}

// ============================================================================
// Collection requests
// ============================================================================

/// Body of `POST /collections` and `PUT /collections/{id}`.
#[derive(Debug, Deserialize)]
pub struct CollectionRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub links: Option<Vec<LinkId>>,
}

impl CollectionRequest {
    /// For creation: omitted fields start empty.
    pub fn validate(self) -> Result<CollectionFields, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = errors.check("name", required(self.name).and_then(validate_name));

        match name {
            Some(name) if errors.is_empty() => Ok(CollectionFields {
                name,
                description: self.description.flatten(),
                links: Some(self.links.unwrap_or_default()),
            }),
            _ => Err(errors),
        }
    }

    /// For `PUT`: `name` is required, anything omitted is kept.
    pub fn validate_replace(self) -> Result<CollectionPatch, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = errors.check("name", required(self.name).and_then(validate_name));
        errors.into_result()?;

        Ok(CollectionPatch {
            name,
            description: self.description,
            links: self.links,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchCollectionRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub links: Option<Vec<LinkId>>,
}

impl PatchCollectionRequest {
    pub fn validate(self) -> Result<CollectionPatch, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = self.name.and_then(|n| errors.check("name", validate_name(n)));

        errors.into_result()?;

        Ok(CollectionPatch {
            name,
            description: self.description,
            links: self.links,
        })
    }
}

/// Required field whose content is checked by the caller.
fn required(value: Option<String>) -> Result<String, String> {
    value.ok_or_else(|| REQUIRED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_link_distinguishes_null_from_absent() {
        let absent: PatchLinkRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.description, None);

        let null: PatchLinkRequest = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let set: PatchLinkRequest = serde_json::from_str(r#"{"description":"d"}"#).unwrap();
        assert_eq!(set.description, Some(Some("d".to_string())));
    }

    #[test]
    fn replace_link_reports_every_bad_field() {
        let req: ReplaceLinkRequest =
            serde_json::from_str(r#"{"url":"nope","link_type":"podcast"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some(REQUIRED));
        assert_eq!(errors.get("url"), Some("Enter a valid URL."));
        assert_eq!(errors.get("link_type"), Some("\"podcast\" is not a valid choice."));
    }

    #[test]
    fn replace_link_keeps_omitted_optionals() {
        let req: ReplaceLinkRequest =
            serde_json::from_str(r#"{"title":"T","url":"https://example.com/"}"#).unwrap();
        let patch = req.validate().unwrap();
        assert_eq!(patch.title.as_deref(), Some("T"));
        assert_eq!(patch.url.as_deref(), Some("https://example.com/"));
        assert_eq!(patch.description, None);
        assert_eq!(patch.image, None);
        assert_eq!(patch.link_type, None);

        let req: ReplaceLinkRequest = serde_json::from_str(
            r#"{"title":"T","url":"https://example.com/","description":null,"link_type":"video"}"#,
        )
        .unwrap();
        let patch = req.validate().unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.link_type, Some(LinkType::Video));
    }

    #[test]
    fn create_link_requires_url() {
        let req: CreateLinkRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().unwrap_err().get("url").is_some());

        let req: CreateLinkRequest = serde_json::from_str(r#"{"url":""}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn collection_request_defaults_links() {
        let req: CollectionRequest = serde_json::from_str(r#"{"name":"Reading"}"#).unwrap();
        let fields = req.validate().unwrap();
        assert_eq!(fields.links, Some(Vec::new()));
        assert_eq!(fields.description, None);

        let req: CollectionRequest = serde_json::from_str(r#"{"links":[1]}"#).unwrap();
        assert_eq!(req.validate().unwrap_err().get("name"), Some(REQUIRED));
    }

    #[test]
    fn collection_replace_keeps_omitted_fields() {
        let req: CollectionRequest = serde_json::from_str(r#"{"name":"Renamed"}"#).unwrap();
        let patch = req.validate_replace().unwrap();
        assert_eq!(patch.name.as_deref(), Some("Renamed"));
        assert_eq!(patch.description, None);
        assert_eq!(patch.links, None);

        let req: CollectionRequest =
            serde_json::from_str(r#"{"description":"d","links":[]}"#).unwrap();
        assert_eq!(req.validate_replace().unwrap_err().get("name"), Some(REQUIRED));
    }

    #[test]
    fn error_envelope_omits_empty_fields() {
        let body = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(body, serde_json::json!({"success": false, "error": "nope"}));
    }
}
