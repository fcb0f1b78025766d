use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Prefix under which every archived record is stored.
pub const ARCHIVE_PREFIX: &str = "weather-data";

/// Timestamp layout used inside archive keys.
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Default region constraint for newly created buckets.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Raw response body of the current-weather endpoint for one city.
///
/// The value is kept exactly as received so it can be archived verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherRecord(Value);

impl WeatherRecord {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).context("Failed to serialize weather record to JSON")
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw = serde_json::from_slice(bytes).context("Archived object is not valid JSON")?;
        Ok(Self(raw))
    }

    /// Pull out the handful of fields shown to the user.
    pub fn summary(&self) -> Result<WeatherSummary> {
        let parsed = OwCurrent::deserialize(&self.0)
            .context("Weather record is missing `main` or `weather` fields")?;

        let description = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .context("Weather record has an empty `weather` list")?;

        Ok(WeatherSummary {
            description,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity: parsed.main.humidity,
        })
    }
}

impl From<Value> for WeatherRecord {
    fn from(raw: Value) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Number,
    feels_like: Number,
    humidity: Number,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrent {
    main: OwMain,
    weather: Vec<OwWeather>,
}

/// Fields extracted from a [`WeatherRecord`] for display.
///
/// Numbers are kept as JSON numbers so they print the way the API sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSummary {
    pub description: String,
    pub temperature: Number,
    pub feels_like: Number,
    pub humidity: Number,
}

impl WeatherSummary {
    /// The summary block printed after a city is processed.
    pub fn lines(&self) -> [String; 4] {
        [
            format!("Temperature: {}°F", self.temperature),
            format!("Feels like: {}°F", self.feels_like),
            format!("Humidity: {}%", self.humidity),
            format!("Conditions: {}", title_case(&self.description)),
        ]
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest.
///
/// A word starts after any uncased character, so `"light rain"` becomes
/// `"Light Rain"`, `"o'hare"` becomes `"O'Hare"` and `"日本abc"` becomes
/// `"日本Abc"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;

    for c in s.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_lowercase() || c.is_uppercase();
    }

    out
}

/// Object key of one archived record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveKey(String);

impl ArchiveKey {
    /// `weather-data/{city}-{YYYYMMDD-HHMMSS}.json`
    pub fn new<Tz>(city: &str, at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self(format!(
            "{ARCHIVE_PREFIX}/{city}-{}.json",
            at.format(KEY_TIMESTAMP_FORMAT)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArchiveKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named bucket pinned to a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDescriptor {
    pub name: String,
    pub region: String,
}

impl BucketDescriptor {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
        }
    }

    /// `us-east-1` buckets must be created without a location constraint.
    pub fn location_constraint(&self) -> Option<&str> {
        match self.region.as_str() {
            "" | "us-east-1" => None,
            region => Some(region),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Split a comma-separated line into city names.
///
/// Names are trimmed and empty entries are dropped.
pub fn parse_cities(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate, Utc};
    use serde_json::json;

    fn sample() -> WeatherRecord {
        WeatherRecord::new(json!({
            "name": "Seattle",
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain" }],
            "main": { "temp": 52.3, "feels_like": 50.9, "humidity": 87 }
        }))
    }

    #[test]
    fn summary_reads_consumed_fields() {
        let summary = sample().summary().expect("summary");

        assert_eq!(summary.description, "light rain");
        assert_eq!(summary.temperature.to_string(), "52.3");
        assert_eq!(summary.feels_like.to_string(), "50.9");
        assert_eq!(summary.humidity.to_string(), "87");
    }

    #[test]
    fn summary_lines_format() {
        let lines = sample().summary().unwrap().lines();
        assert_eq!(
            lines,
            [
                "Temperature: 52.3°F".to_string(),
                "Feels like: 50.9°F".to_string(),
                "Humidity: 87%".to_string(),
                "Conditions: Light Rain".to_string(),
            ]
        );
    }

    #[test]
    fn summary_errors_on_missing_fields() {
        let record = WeatherRecord::new(json!({ "cod": "404", "message": "city not found" }));
        assert!(record.summary().is_err());

        let record = WeatherRecord::new(json!({
            "weather": [],
            "main": { "temp": 1, "feels_like": 1, "humidity": 1 }
        }));
        let err = record.summary().unwrap_err();
        assert!(err.to_string().contains("empty `weather` list"));
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("overcast clouds"), "Overcast Clouds");
        assert_eq!(title_case("THUNDERSTORM with rain"), "Thunderstorm With Rain");
        assert_eq!(title_case("o'hare"), "O'Hare");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn title_case_starts_word_after_uncased_letters() {
        assert_eq!(title_case("日本abc"), "日本Abc");
        assert_eq!(title_case("rain2day"), "Rain2Day");
    }

    #[test]
    fn archive_key_layout() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap()
            .and_utc();

        let key = ArchiveKey::new("Tokyo", &at);
        assert_eq!(key.as_str(), "weather-data/Tokyo-20240307-090501.json");
    }

    #[test]
    fn archive_key_uses_given_timezone() {
        let now = Local::now();
        let key = ArchiveKey::new("Paris", &now);
        let expected = format!("weather-data/Paris-{}.json", now.format("%Y%m%d-%H%M%S"));
        assert_eq!(key.to_string(), expected);

        let utc = Utc::now();
        assert!(ArchiveKey::new("Paris", &utc).as_str().starts_with("weather-data/Paris-"));
    }

    #[test]
    fn location_constraint_skips_us_east_1() {
        let west = BucketDescriptor::new("b", "us-west-2");
        assert_eq!(west.location_constraint(), Some("us-west-2"));
        assert_eq!(BucketDescriptor::new("b", "us-east-1").location_constraint(), None);
    }

    #[test]
    fn parse_cities_trims_and_drops_empty() {
        assert_eq!(parse_cities("Seattle,Tokyo"), vec!["Seattle", "Tokyo"]);
        assert_eq!(parse_cities(" Seattle , Tokyo ,,\n"), vec!["Seattle", "Tokyo"]);
        assert!(parse_cities("  ").is_empty());
    }

    #[test]
    fn record_json_round_trip() {
        let record = sample();
        let bytes = record.to_json_bytes().unwrap();
        assert_eq!(WeatherRecord::from_json_slice(&bytes).unwrap(), record);
    }
}
