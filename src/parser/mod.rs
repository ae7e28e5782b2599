pub mod opengraph;

pub use opengraph::{PageMetadata, parse_metadata};
