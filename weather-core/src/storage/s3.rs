use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, meta::region::RegionProviderChain};
use aws_sdk_s3::{
    Client,
    error::{DisplayErrorContext, SdkError},
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};

use super::{ObjectStore, StoreError};
use crate::model::BucketDescriptor;

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the standard AWS provider chain (env, profile,
    /// instance metadata). `fallback_region` is used when no region is
    /// configured anywhere else.
    pub async fn from_env(fallback_region: &str) -> Self {
        let region = RegionProviderChain::default_provider()
            .or_else(Region::new(fallback_region.to_owned()));

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        tracing::debug!(region = ?sdk_config.region(), "loaded AWS configuration");

        Self::new(Client::new(&sdk_config))
    }
}

fn request_error<E, R>(operation: &'static str, bucket: &str, err: &SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::Request {
        operation,
        bucket: bucket.to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let not_found = err.as_service_error().is_some_and(|e| e.is_not_found())
                    || err.raw_response().is_some_and(|r| r.status().as_u16() == 404);

                if not_found {
                    Ok(false)
                } else {
                    Err(request_error("HeadBucket", bucket, &err))
                }
            }
        }
    }

    async fn create_bucket(&self, bucket: &BucketDescriptor) -> Result<(), StoreError> {
        let mut request = self.client.create_bucket().bucket(&bucket.name);

        if let Some(region) = bucket.location_constraint() {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|err| request_error("CreateBucket", &bucket.name, &err))?;

        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| request_error("PutObject", bucket, &err))?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Err(StoreError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                });
            }
            Err(err) => return Err(request_error("GetObject", bucket, &err)),
        };

        let data = output.body.collect().await.map_err(|err| StoreError::Body {
            key: key.to_string(),
            message: err.to_string(),
        })?;

        Ok(data.into_bytes().to_vec())
    }
}
