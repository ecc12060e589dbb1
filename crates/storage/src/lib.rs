pub mod backend;
pub mod error;
pub mod key;

pub use backend::{ObjectStorage, S3Storage};
pub use error::StorageError;
pub use key::ArtifactKey;
