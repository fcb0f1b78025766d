use thiserror::Error;

use crate::model::BucketDescriptor;
use crate::storage::{ObjectStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    AlreadyExists,
    Created,
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Error checking bucket: {0}")]
    Probe(#[source] StoreError),

    #[error("Error creating bucket: {0}")]
    Create(#[source] StoreError),
}

/// Make sure `bucket` exists, creating it with its region constraint when the
/// existence probe reports it missing. Performs at most one creation call.
pub async fn ensure_bucket<S>(
    store: &S,
    bucket: &BucketDescriptor,
) -> Result<BucketStatus, ProvisionError>
where
    S: ObjectStore + ?Sized,
{
    let exists = store.bucket_exists(&bucket.name).await.map_err(ProvisionError::Probe)?;

    if exists {
        tracing::info!(bucket = %bucket.name, "bucket already exists");
        return Ok(BucketStatus::AlreadyExists);
    }

    tracing::info!(bucket = %bucket.name, region = %bucket.region, "creating bucket");
    store.create_bucket(bucket).await.map_err(ProvisionError::Create)?;

    Ok(BucketStatus::Created)
}
