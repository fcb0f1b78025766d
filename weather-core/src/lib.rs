//! Core library for the `weather-archive` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its OpenWeather implementation
//! - The object store abstraction and its S3 implementation
//! - Bucket provisioning, archiving and the per-city batch driver
//!
//! It is used by `weather-archive-cli`, but can also be reused by other binaries or services.

pub mod archive;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod provisioner;
pub mod storage;

pub use archive::{ArchiveError, ArchiveWriter};
pub use config::{Config, Settings};
pub use model::{
    ArchiveKey, BucketDescriptor, RunReport, WeatherRecord, WeatherSummary, parse_cities,
};
pub use pipeline::WeatherArchiver;
pub use provider::{OpenWeatherProvider, WeatherProvider};
pub use provisioner::{BucketStatus, ProvisionError, ensure_bucket};
pub use storage::{ObjectStore, S3Store, StoreError};
