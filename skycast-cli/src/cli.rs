use anyhow::Result;
use clap::{Parser, Subcommand};
use inquire::Text;

use skycast_core::Config;

use crate::app;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Terminal weather widget")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up current weather once and exit.
    Show {
        /// City name; uses your location when omitted.
        city: Option<String>,
    },

    /// Store the API key and the fallback city.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            // No subcommand: the interactive widget.
            None => app::run_widget().await,
            Some(Command::Show { city }) => app::run_once(city).await,
            Some(Command::Configure) => configure(),
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = Text::new("OpenWeatherMap API key (empty keeps the bundled demo key):")
        .with_initial_value(config.api_key.as_deref().unwrap_or(""))
        .prompt()?;
    config.api_key = match key.trim() {
        "" => None,
        key => Some(key.to_string()),
    };

    let city = Text::new("Fallback city for denied geolocation:")
        .with_initial_value(config.default_city())
        .prompt()?;
    config.default_city = match city.trim() {
        "" => None,
        city => Some(city.to_string()),
    };

    config.save()?;
    println!("Saved to {}", Config::config_file_path()?.display());

    Ok(())
}
