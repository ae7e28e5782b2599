pub use super::auth_tokens::Entity as AuthTokens;
pub use super::collection_links::Entity as CollectionLinks;
pub use super::collections::Entity as Collections;
pub use super::links::Entity as Links;
pub use super::password_reset_tokens::Entity as PasswordResetTokens;
pub use super::users::Entity as Users;
