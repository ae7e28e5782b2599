pub mod prelude;

pub mod auth_tokens;
pub mod collection_links;
pub mod collections;
pub mod links;
pub mod password_reset_tokens;
pub mod users;
