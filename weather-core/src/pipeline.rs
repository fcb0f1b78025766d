//! Batch driver: provision the bucket once, then fetch, archive and summarize
//! each city in turn.

use anyhow::Result;
use std::io::Write;

use crate::archive::ArchiveWriter;
use crate::model::{ArchiveKey, BucketDescriptor, RunReport, WeatherRecord};
use crate::provider::WeatherProvider;
use crate::provisioner::{self, BucketStatus};
use crate::storage::ObjectStore;

#[derive(Debug)]
pub struct WeatherArchiver<P, S> {
    provider: P,
    writer: ArchiveWriter<S>,
    bucket: BucketDescriptor,
}

impl<P, S> WeatherArchiver<P, S>
where
    P: WeatherProvider,
    S: ObjectStore,
{
    pub fn new(provider: P, store: S, bucket: BucketDescriptor) -> Self {
        let writer = ArchiveWriter::new(store, bucket.name.clone());
        Self {
            provider,
            writer,
            bucket,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn writer(&self) -> &ArchiveWriter<S> {
        &self.writer
    }

    /// Create the bucket if needed and report what happened on `out`.
    pub async fn ensure_bucket(&self, out: &mut dyn Write) -> Result<BucketStatus> {
        let status = provisioner::ensure_bucket(self.writer.store(), &self.bucket).await?;
        let name = &self.bucket.name;

        match status {
            BucketStatus::AlreadyExists => {
                writeln!(out, "Bucket {name} already exists")?;
                writeln!(out, "Skipping creation")?;
                writeln!(out, "Proceeding to get weather data...")?;
                writeln!(out)?;
            }
            BucketStatus::Created => {
                writeln!(out, "Bucket {name} created successfully")?;
            }
        }

        Ok(status)
    }

    /// Fetch weather for `city`. Failures are logged and turned into `None`
    /// so one bad city never stops the batch.
    pub async fn fetch_weather(&self, city: &str) -> Option<WeatherRecord> {
        match self.provider.get_weather(city).await {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::error!(city, "Error getting weather data: {err:#}");
                None
            }
        }
    }

    pub async fn archive(
        &self,
        record: Option<&WeatherRecord>,
        city: &str,
    ) -> Option<ArchiveKey> {
        self.writer.archive(record, city).await
    }

    /// Fetch, archive and print one city. Returns `true` when the city was
    /// fully processed.
    pub async fn process_city(&self, city: &str, out: &mut dyn Write) -> Result<bool> {
        tracing::info!("Getting weather data for {city}...");

        let Some(record) = self.fetch_weather(city).await else {
            writeln!(out, "Failed to process {city} No data saved")?;
            return Ok(false);
        };

        if let Some(key) = self.archive(Some(&record), city).await {
            writeln!(out, "Weather Data for {city} saved to: {key}")?;
        }

        let summary = match record.summary() {
            Ok(summary) => summary,
            Err(err) => {
                writeln!(out, "Could not summarize weather data for {city}: {err:#}")?;
                return Ok(false);
            }
        };

        for line in summary.lines() {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "Weather Data processed successfully for {city}")?;
        writeln!(out)?;

        Ok(true)
    }

    /// Provision the bucket, then process every city in order.
    pub async fn run<I>(&self, cities: I, out: &mut dyn Write) -> Result<RunReport>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.ensure_bucket(out).await?;
        self.process_cities(cities, out).await
    }

    /// Process every city in order. The bucket must already exist.
    pub async fn process_cities<I>(&self, cities: I, out: &mut dyn Write) -> Result<RunReport>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut report = RunReport::default();
        for city in cities {
            let city = city.as_ref();
            if self.process_city(city, out).await? {
                report.processed.push(city.to_string());
            } else {
                report.skipped.push(city.to_string());
            }
        }

        tracing::info!(
            processed = report.processed.len(),
            skipped = report.skipped.len(),
            "batch finished"
        );

        Ok(report)
    }
}
