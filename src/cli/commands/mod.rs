mod extract;
mod user;

pub use extract::cmd_extract;
pub use user::{cmd_create_user, cmd_delete_user};
