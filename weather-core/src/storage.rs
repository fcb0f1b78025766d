//! Object storage abstraction and its S3 implementation.

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::BucketDescriptor;

pub mod s3;

#[cfg(test)]
pub(crate) mod memory;

pub use s3::S3Store;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} failed for bucket '{bucket}': {message}")]
    Request {
        operation: &'static str,
        bucket: String,
        message: String,
    },

    #[error("object '{key}' not found in bucket '{bucket}'")]
    ObjectNotFound { bucket: String, key: String },

    #[error("failed to read body of '{key}': {message}")]
    Body { key: String, message: String },
}

/// The handful of bucket and object calls the archiver needs.
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Existence probe. `Ok(false)` means the bucket does not exist; any other
    /// failure (permissions, network) is an error.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError>;

    async fn create_bucket(&self, bucket: &BucketDescriptor) -> Result<(), StoreError>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
}
