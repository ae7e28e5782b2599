pub mod opengraph;

pub use opengraph::{ExtractedMetadata, MetadataExtractor, OpenGraphClient};
