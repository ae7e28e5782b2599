pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, Registration, TokenPair};
pub use auth_service_impl::SeaOrmAuthService;

pub mod link_service;
pub mod link_service_impl;
pub use link_service::{LinkError, LinkService};
pub use link_service_impl::SeaOrmLinkService;

pub mod collection_service;
pub mod collection_service_impl;
pub use collection_service::{CollectionError, CollectionService};
pub use collection_service_impl::SeaOrmCollectionService;

pub mod mailer;
pub use mailer::{LogMailer, MailMessage, Mailer};
