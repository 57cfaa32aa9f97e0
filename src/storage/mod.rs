pub mod blob;
pub mod gateway;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use gateway::{JsonGateway, NullGateway, PersistenceGateway};
