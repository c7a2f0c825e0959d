//! Blob store abstraction

mod filesystem;
mod s3;
mod traits;

pub use filesystem::FilesystemStore;
pub use s3::S3Store;
pub use traits::{BlobStore, StorageError};
