mod prompt;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempestade_crypto::Zeroizing;
use tempestade_settings::{Provider, SettingsError, SettingsStore};
use tempestade_storage::FileStore;
use tempestade_weather::{
    storm_risk, AdviceClient, AdviceRequest, ForecastClient, LocationClient, StormRiskSummary,
    WeatherConfig, DEFAULT_HOURS_AHEAD,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const STORAGE_FILE: &str = "storage.json";
const WEATHER_CONFIG_FILE: &str = "weather.json";
const OPENAI_ADVICE_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_ADVICE_MODEL: &str = "gpt-4o-mini";

#[derive(Parser, Debug)]
#[command(name = "tempestade")]
#[command(about = "Local storm risk with an encrypted AI key", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding storage.json and weather.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Change the advice provider
    Provider {
        /// openrouter or openai
        provider: Provider,
    },

    /// Show the storm risk for the next hours
    Risk {
        /// Hours ahead to consider
        #[arg(long, default_value_t = DEFAULT_HOURS_AHEAD)]
        hours: u32,

        /// Ask the configured provider for advice (prompts for the master password)
        #[arg(long)]
        advice: bool,
    },
}

#[derive(Subcommand, Debug)]
enum KeyCommands {
    /// Encrypt and store an API key
    Set {
        /// Provider the key belongs to (defaults to the current one)
        #[arg(long)]
        provider: Option<Provider>,
    },

    /// Show the provider and whether a key is stored
    Status,

    /// Check that the master password opens the stored key
    Check,

    /// Remove the stored configuration
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let store_path = data_dir.join(STORAGE_FILE);
    debug!("using storage at {}", store_path.display());
    let store = FileStore::open(&store_path)
        .with_context(|| format!("opening {}", store_path.display()))?;
    let settings = SettingsStore::new(Arc::new(store));

    match cli.command {
        Commands::Key { command } => handle_key_command(command, &settings).await,
        Commands::Provider { provider } => {
            settings.set_provider(provider)?;
            println!("Provider set to {provider}");
            Ok(())
        }
        Commands::Risk { hours, advice } => {
            let config = load_weather_config(&data_dir)?;
            run_risk(&settings, config, hours, advice).await
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tempestade")
}

/// Reads `weather.json` from the data directory; missing fields keep their defaults.
fn load_weather_config(data_dir: &Path) -> Result<WeatherConfig> {
    let path = data_dir.join(WEATHER_CONFIG_FILE);
    if !path.exists() {
        return Ok(WeatherConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Advice endpoint for `provider`. OpenRouter uses the configured endpoint as is.
fn advice_config_for(mut config: WeatherConfig, provider: Provider) -> WeatherConfig {
    if provider == Provider::OpenAi && config.advice_url == WeatherConfig::default().advice_url {
        config.advice_url = OPENAI_ADVICE_URL.to_string();
        config.advice_model = OPENAI_ADVICE_MODEL.to_string();
    }
    config
}

async fn handle_key_command(command: KeyCommands, settings: &SettingsStore) -> Result<()> {
    match command {
        KeyCommands::Set { provider } => {
            let provider = match provider {
                Some(p) => p,
                None => settings.provider()?,
            };
            let api_key = prompt::api_key()?;
            let password = prompt::new_master_password()?;
            settings
                .save_api_key_async(api_key, password, provider)
                .await?;
            println!("API key stored for {provider}");
        }
        KeyCommands::Status => {
            let provider = settings.provider()?;
            let stored = settings.has_stored_key()?;
            println!("Provider: {provider}");
            println!("Key stored: {}", if stored { "yes" } else { "no" });
        }
        KeyCommands::Check => {
            let password = prompt::master_password()?;
            check_key(settings, password).await?;
            println!("Master password OK");
        }
        KeyCommands::Clear => {
            settings.clear()?;
            println!("Stored configuration removed");
        }
    }
    Ok(())
}

/// Fails with [`SettingsError::Locked`] unless `password` opens the stored key,
/// so a wrong password ends the process with a non-zero status.
async fn check_key(settings: &SettingsStore, password: Zeroizing<String>) -> Result<()> {
    settings.decrypted_key_async(password).await?;
    Ok(())
}

async fn run_risk(
    settings: &SettingsStore,
    config: WeatherConfig,
    hours: u32,
    advice: bool,
) -> Result<()> {
    let location = LocationClient::new(&config)?
        .locate()
        .await
        .context("resolving location")?;
    let points = ForecastClient::new(&config)?
        .hourly(location.latitude, location.longitude)
        .await
        .context("fetching forecast")?;
    let summary = storm_risk(&points, chrono::Utc::now(), hours);
    print_summary(&location.label(), &summary);

    if !advice {
        return Ok(());
    }

    let provider = settings.provider()?;
    let password = prompt::master_password()?;
    let api_key = match settings.decrypted_key_async(password).await {
        Ok(key) => key,
        Err(SettingsError::Locked) => {
            println!("{}", SettingsError::Locked);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let request = AdviceRequest {
        location_label: location.label(),
        summary,
    };
    let client = AdviceClient::new(&advice_config_for(config, provider))?;
    let text = client.advise(&api_key, &request).await;
    drop(api_key);

    println!();
    println!("{}", text.context("requesting advice")?);
    Ok(())
}

fn print_summary(location: &str, summary: &StormRiskSummary) {
    println!("Location: {location}");
    println!("Risk: {}", summary.level.as_str().to_uppercase());
    println!("{}", summary.reason);
    for point in &summary.next_hours {
        let rain = point
            .precipitation_probability
            .map_or_else(|| "-".to_string(), |p| format!("{p:.0}%"));
        let gusts = point
            .wind_gusts
            .map_or_else(|| "-".to_string(), |g| format!("{g:.1}"));
        let code = point
            .weather_code
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        println!(
            "  {}  rain {rain:>4}  gusts {gusts:>5}  code {code}",
            point.time.format("%H:%M")
        );
    }
}
