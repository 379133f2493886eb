use anyhow::Result;
use clap::{Args, Subcommand};

use codeshade::config::{force_clear, reconcile, Config, ConfigPaths, ConfigStore, ConfigUpdate, Provider};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the active configuration
    Show,

    /// Read a single configuration field
    Get { key: String },

    /// Update a single configuration field
    Set { key: String, value: String },

    /// List every path the startup scan visits
    Paths,

    /// Delete every discovered config file, valid or not, and start over
    Reset,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let paths = ConfigPaths::resolve();

    if let ConfigCommands::Reset = args.command {
        let report = force_clear(&paths);
        for path in &report.removed {
            println!("removed {}", path.display());
        }
        println!("{} config file(s) removed", report.removed.len());
        return Ok(());
    }

    // Same pass the application runs at startup: prune stale copies before
    // the store touches the canonical file.
    reconcile(&paths);
    let store = ConfigStore::new(paths);

    match args.command {
        ConfigCommands::Show => {
            let config = store.load();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Get { key } => {
            println!("{}", get_value(&store.load(), &key)?);
        }
        ConfigCommands::Set { key, value } => {
            let config = store.update(update_for(&key, &value)?);
            println!("{key} = {}", get_value(&config, &key)?);
        }
        ConfigCommands::Paths => {
            let config_paths = store.paths();
            for path in config_paths.candidates() {
                let mut notes = Vec::new();
                if path == config_paths.canonical() {
                    notes.push("canonical");
                }
                if path.exists() {
                    notes.push("exists");
                }
                if notes.is_empty() {
                    println!("{}", path.display());
                } else {
                    println!("{} ({})", path.display(), notes.join(", "));
                }
            }
        }
        ConfigCommands::Reset => unreachable!("handled above"),
    }

    Ok(())
}

fn get_value(config: &Config, key: &str) -> Result<String> {
    match key {
        "apiKey" => Ok(config.api_key.clone()),
        "apiProvider" => Ok(config.api_provider.to_string()),
        "extractionModel" => Ok(config.extraction_model.clone()),
        "solutionModel" => Ok(config.solution_model.clone()),
        "debuggingModel" => Ok(config.debugging_model.clone()),
        "language" => Ok(config.language.clone()),
        "opacity" => Ok(config.opacity.to_string()),
        _ => anyhow::bail!("Unknown config key: {}", key),
    }
}

fn update_for(key: &str, value: &str) -> Result<ConfigUpdate> {
    let mut update = ConfigUpdate::default();

    match key {
        "apiKey" => update.api_key = Some(value.to_string()),
        "apiProvider" => {
            update.api_provider = Some(
                Provider::parse(value)
                    .ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", value))?,
            )
        }
        "extractionModel" => update.extraction_model = Some(value.to_string()),
        "solutionModel" => update.solution_model = Some(value.to_string()),
        "debuggingModel" => update.debugging_model = Some(value.to_string()),
        "language" => update.language = Some(value.to_string()),
        "opacity" => update.opacity = Some(value.parse()?),
        _ => anyhow::bail!("Unknown config key: {}", key),
    }

    Ok(update)
}
