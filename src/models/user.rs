use serde::Serialize;

use crate::domain::UserId;

/// User data returned from the store (without the password hash).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Registration input. `password` is plaintext and hashed before it is stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    #[must_use]
    pub const fn regular(username: String, email: String, password: String) -> Self {
        Self {
            username,
            email,
            password,
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// Lower-cases the domain part of an address, leaving the local part as typed.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("John.Doe@Example.COM"), "John.Doe@example.com");
        assert_eq!(normalize_email("  a@B.org "), "a@b.org");
    }

    #[test]
    fn normalize_email_without_at_is_untouched() {
        assert_eq!(normalize_email("not-an-email"), "not-an-email");
    }
}
