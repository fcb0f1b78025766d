use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::WeatherRecord;

pub mod openweather;

pub use openweather::{OPENWEATHER_CURRENT_URL, OpenWeatherProvider};

/// Source of current weather for a named city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, city: &str) -> anyhow::Result<WeatherRecord>;
}

