use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ObjectStore, StoreError};
use crate::model::BucketDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeSet<String>,
    objects: BTreeMap<(String, String), StoredObject>,
    created: Vec<BucketDescriptor>,
    puts: Vec<String>,
    probe_error: Option<String>,
    create_error: Option<String>,
    put_error: Option<String>,
}

/// In-memory store that records every call.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn with_bucket(name: &str) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().buckets.insert(name.to_string());
        store
    }

    pub fn fail_probe(&self, message: &str) {
        self.state.lock().unwrap().probe_error = Some(message.to_string());
    }

    pub fn fail_create(&self, message: &str) {
        self.state.lock().unwrap().create_error = Some(message.to_string());
    }

    pub fn fail_put(&self, message: &str) {
        self.state.lock().unwrap().put_error = Some(message.to_string());
    }

    pub fn created(&self) -> Vec<BucketDescriptor> {
        self.state.lock().unwrap().created.clone()
    }

    /// Keys of every successful put, in call order.
    pub fn put_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

fn failure(operation: &'static str, bucket: &str, message: &str) -> StoreError {
    StoreError::Request {
        operation,
        bucket: bucket.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StoreError> {
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.probe_error {
            return Err(failure("HeadBucket", bucket, message));
        }
        Ok(state.buckets.contains(bucket))
    }

    async fn create_bucket(&self, bucket: &BucketDescriptor) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.create_error {
            return Err(failure("CreateBucket", &bucket.name, message));
        }
        state.buckets.insert(bucket.name.clone());
        state.created.push(bucket.clone());
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.put_error {
            return Err(failure("PutObject", bucket, message));
        }
        if !state.buckets.contains(bucket) {
            return Err(failure("PutObject", bucket, "NoSuchBucket"));
        }
        state.puts.push(key.to_string());
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.body.clone())
            .ok_or_else(|| StoreError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}
