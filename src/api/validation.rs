//! Field checks for request bodies.
//!
//! Each `validate_*` function checks one field. Request types collect the
//! failures of all their fields into a [`FieldErrors`] so the client sees
//! every problem at once.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

use crate::constants::limits::{
    MAX_NAME_LENGTH, MAX_TITLE_LENGTH, MAX_URL_LENGTH, MAX_USERNAME_LENGTH,
};
use crate::domain::LinkType;

pub const REQUIRED: &str = "This field is required.";

/// Validation messages keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Records the first message for `field`; later ones are dropped.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Stores `value` if it validated, otherwise records the error.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

pub fn validate_required(value: Option<String>) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        Some(_) => Err("This field may not be blank.".to_string()),
        None => Err(REQUIRED.to_string()),
    }
}

fn validate_max_len(value: &str, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len > max {
        return Err(format!(
            "Ensure this field has no more than {max} characters."
        ));
    }
    Ok(())
}

pub fn validate_title(title: String) -> Result<String, String> {
    if title.trim().is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    validate_max_len(&title, MAX_TITLE_LENGTH)?;
    Ok(title)
}

pub fn validate_name(name: String) -> Result<String, String> {
    if name.trim().is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    validate_max_len(&name, MAX_NAME_LENGTH)?;
    Ok(name)
}

/// Absolute http(s) URL of at most 200 characters.
pub fn validate_url(url: String) -> Result<String, String> {
    if url.trim().is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    validate_max_len(&url, MAX_URL_LENGTH)?;

    match Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(url),
        _ => Err("Enter a valid URL.".to_string()),
    }
}

/// Like [`validate_url`], but an empty string clears the image.
pub fn validate_image(image: Option<String>) -> Result<Option<String>, String> {
    match image {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(Some(s)),
        Some(s) => validate_url(s).map(Some),
    }
}

pub fn validate_link_type(value: &str) -> Result<LinkType, String> {
    value.parse()
}

pub fn validate_username(username: String) -> Result<String, String> {
    if username.is_empty() {
        return Err("This field may not be blank.".to_string());
    }
    validate_max_len(&username, MAX_USERNAME_LENGTH)?;

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }

    Ok(username)
}

pub fn validate_email(email: String) -> Result<String, String> {
    let trimmed = email.trim();
    let valid = trimmed.rsplit_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.is_empty()
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.contains('.')
            && !trimmed.contains(char::is_whitespace)
    });

    if valid {
        Ok(trimmed.to_string())
    } else {
        Err("Enter a valid email address.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required(Some("x".into())).unwrap(), "x");
        assert_eq!(validate_required(None).unwrap_err(), REQUIRED);
        assert!(validate_required(Some("   ".into())).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/a?b=c".into()).is_ok());
        assert!(validate_url("http://localhost:8000/".into()).is_ok());
        assert!(validate_url("ftp://example.com/".into()).is_err());
        assert!(validate_url("example.com".into()).is_err());
        assert!(validate_url(String::new()).is_err());

        let long = format!("https://example.com/{}", "a".repeat(200));
        assert!(validate_url(long).unwrap_err().contains("200"));
    }

    #[test]
    fn test_validate_image() {
        assert_eq!(validate_image(None).unwrap(), None);
        assert_eq!(validate_image(Some(String::new())).unwrap(), Some(String::new()));
        assert!(validate_image(Some("not a url".into())).is_err());
    }

    #[test]
    fn test_validate_title_length() {
        assert!(validate_title("a".repeat(255)).is_ok());
        assert!(validate_title("a".repeat(256)).is_err());
        assert!(validate_title(" ".into()).is_err());
    }

    #[test]
    fn test_validate_link_type() {
        assert_eq!(validate_link_type("book").unwrap(), LinkType::Book);
        assert_eq!(
            validate_link_type("podcast").unwrap_err(),
            "\"podcast\" is not a valid choice."
        );
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice.b+1@x".into()).is_ok());
        assert!(validate_username("has space".into()).is_err());
        assert!(validate_username("a".repeat(151)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" a@b.org ".into()).unwrap(), "a@b.org");
        assert!(validate_email("a@b".into()).is_err());
        assert!(validate_email("@b.org".into()).is_err());
        assert!(validate_email("a b@c.org".into()).is_err());
    }

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut errors = FieldErrors::default();
        errors.add("url", "first");
        errors.add("url", "second");
        errors.add("title", "bad");
        assert_eq!(errors.get("url"), Some("first"));
        assert_eq!(errors.to_string(), "title: bad; url: first");
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::default().into_result().is_ok());
    }
}
