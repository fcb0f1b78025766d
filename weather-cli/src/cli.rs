use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use std::io::{self, BufRead, Write};

use weather_archive_core::{
    ArchiveWriter, Config, OpenWeatherProvider, S3Store, WeatherArchiver, parse_cities,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-archive",
    version,
    about = "Fetch current weather for cities and archive it to S3"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Fetch, archive and summarize weather for a list of cities (default).
    Run {
        /// Comma-separated city names; read from stdin when absent.
        #[arg(long)]
        cities: Option<String>,
    },

    /// Store the API key, bucket name and region in the config file.
    Configure,

    /// Print the summary of an archived record.
    Show {
        /// Object key, e.g. "weather-data/Seattle-20250101-120000.json".
        key: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command.unwrap_or(Command::Run { cities: None }) {
            Command::Run { cities } => run_batch(cities).await,
            Command::Configure => configure(),
            Command::Show { key } => show(&key).await,
        }
    }
}

async fn run_batch(cities: Option<String>) -> Result<()> {
    let settings = Config::load()?.with_env().resolve()?;
    tracing::debug!(
        bucket = %settings.bucket.name,
        region = %settings.bucket.region,
        endpoint = %settings.endpoint,
        "resolved settings"
    );

    let store = S3Store::from_env(&settings.bucket.region).await;
    let provider = OpenWeatherProvider::with_endpoint(settings.api_key, settings.endpoint);
    let archiver = WeatherArchiver::new(provider, store, settings.bucket);

    let mut stdout = io::stdout();
    archiver.ensure_bucket(&mut stdout).await?;

    let line = match cities {
        Some(line) => line,
        None => {
            print!("Enter city names separated by commas: ");
            io::stdout().flush()?;
            read_cities_line(&mut io::stdin().lock())?
        }
    };

    archiver.process_cities(parse_cities(&line), &mut stdout).await?;
    Ok(())
}

/// Read one line of city names. End of input is an error.
fn read_cities_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("Failed to read city names from stdin")?;

    if read == 0 {
        bail!("No city names provided (end of input)");
    }

    Ok(line)
}

fn configure() -> Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key (leave empty to keep current):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if !api_key.trim().is_empty() {
        cfg.openweather_api_key = Some(api_key.trim().to_string());
    }

    let mut bucket_prompt = Text::new("S3 bucket name:");
    if let Some(current) = cfg.bucket_name.as_deref() {
        bucket_prompt = bucket_prompt.with_default(current);
    }
    let bucket = bucket_prompt.prompt()?;

    let region = Text::new("Bucket region:").with_default(cfg.region()).prompt()?;

    cfg.bucket_name = Some(bucket.trim().to_string()).filter(|b| !b.is_empty());
    cfg.region = Some(region.trim().to_string()).filter(|r| !r.is_empty());

    let path = cfg.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

async fn show(key: &str) -> Result<()> {
    let settings = Config::load()?.with_env().resolve()?;
    let store = S3Store::from_env(&settings.bucket.region).await;
    let writer = ArchiveWriter::new(store, settings.bucket.name);
    tracing::debug!(key, bucket = writer.bucket(), "loading archived record");

    let record = writer.load(key).await?;
    for line in record.summary()?.lines() {
        println!("{line}");
    }

    Ok(())
}
