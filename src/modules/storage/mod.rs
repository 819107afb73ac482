//! Storage module for uploaded blobs
//!
//! Provides the `BlobStore` contract and its MinIO/S3-compatible
//! implementation.

mod blob_store;
mod minio_client;
mod public_url;

pub use blob_store::BlobStore;
pub use minio_client::MinIOClient;
pub use public_url::PublicUrlBuilder;
