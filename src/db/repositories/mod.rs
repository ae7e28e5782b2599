pub mod collection;
pub mod link;
pub mod token;
pub mod user;
