pub mod collection;
pub mod link;
pub mod user;
