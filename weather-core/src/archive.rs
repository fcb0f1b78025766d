use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use thiserror::Error;

use crate::model::{ArchiveKey, WeatherRecord};
use crate::storage::{JSON_CONTENT_TYPE, ObjectStore, StoreError};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Error serializing weather data: {0}")]
    Serialize(#[source] anyhow::Error),

    #[error("Error saving data to S3 bucket: {0}")]
    Store(#[from] StoreError),
}

/// Writes weather records into a bucket under timestamped keys.
#[derive(Debug)]
pub struct ArchiveWriter<S> {
    store: S,
    bucket: String,
}

impl<S: ObjectStore> ArchiveWriter<S> {
    pub fn new(store: S, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Archive `record` under a key derived from `city` and the current local
    /// time. Returns the key on success; absent records and storage failures
    /// yield `None`.
    pub async fn archive(
        &self,
        record: Option<&WeatherRecord>,
        city: &str,
    ) -> Option<ArchiveKey> {
        self.archive_at(record, city, &Local::now()).await
    }

    pub async fn archive_at<Tz>(
        &self,
        record: Option<&WeatherRecord>,
        city: &str,
        at: &DateTime<Tz>,
    ) -> Option<ArchiveKey>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let record = record?;
        let key = ArchiveKey::new(city, at);

        match self.put(record, &key).await {
            Ok(()) => {
                tracing::info!(city, key = %key, "weather data archived");
                Some(key)
            }
            Err(err) => {
                tracing::error!(city, key = %key, "{err}");
                None
            }
        }
    }

    async fn put(&self, record: &WeatherRecord, key: &ArchiveKey) -> Result<(), ArchiveError> {
        let body = record.to_json_bytes().map_err(ArchiveError::Serialize)?;

        self.store
            .put_object(&self.bucket, key.as_str(), body, JSON_CONTENT_TYPE)
            .await?;

        Ok(())
    }

    /// Read an archived record back.
    pub async fn load(&self, key: &str) -> Result<WeatherRecord> {
        let bytes = self
            .store
            .get_object(&self.bucket, key)
            .await
            .with_context(|| format!("Failed to read '{key}' from bucket '{}'", self.bucket))?;

        WeatherRecord::from_json_slice(&bytes)
    }
}
