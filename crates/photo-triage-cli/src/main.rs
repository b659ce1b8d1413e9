use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{info, warn};
use photo_triage_core::{api, logging, Config, Triage};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "photo-triage")]
#[command(about = "Flag blurry and duplicate photos, then sort or delete them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults to environment / .env)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to a rotating file instead of the console (per-user data dir if no value)
    #[arg(long, global = true)]
    log_dir: Option<Option<PathBuf>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a folder and print one verdict per image as JSON
    Analyze {
        /// Folder to analyse (not recursive)
        folder: PathBuf,
    },

    /// Apply a list of actions produced (and reviewed) from `analyze`
    Apply {
        /// JSON file with `{"base_folder", "actions"}` or a bare action list; `-` reads stdin
        actions: PathBuf,

        /// Base folder for bucket moves (overrides the payload)
        #[arg(long)]
        base: Option<PathBuf>,

        /// Confirm permanent deletion
        #[arg(long)]
        yes: bool,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "photo-triage.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Set up configuration
    let config = match &cli.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::from_env()?,
    };

    // Initialize logger
    let debug = cli.verbose > 0 || config.debug_log;
    match &cli.log_dir {
        Some(dir) => {
            let dir = dir.clone().unwrap_or_else(logging::default_log_dir);
            logging::init_logger(&dir, debug)
                .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
        }
        None => logging::init_console_logger(debug),
    }

    match cli.command {
        Commands::Analyze { folder } => {
            let triage = Triage::new(config)?;
            let records = triage.analyze(&folder)?;
            info!("Analysed {} images", records.len());
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }

        Commands::Apply { actions, base, yes } => {
            config.validate()?;
            let mut payload = read_payload(&actions)?;
            if let Some(base) = base {
                payload["base_folder"] = json!(base.to_string_lossy());
            }

            let deletes = count_deletes(&payload);
            if deletes > 0 {
                eprintln!(
                    "WARNING: {} file(s) will be permanently deleted. There is no trash and no undo.",
                    deletes
                );
                if !yes {
                    bail!("refusing to delete without --yes");
                }
                warn!("Applying batch with {} permanent deletes", deletes);
            }

            let summary = api::handle_apply(&payload, &config)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }

        Commands::GenerateConfig { path } => {
            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

/// Read an apply payload; a bare list becomes `{"actions": [...]}`
fn read_payload(source: &Path) -> anyhow::Result<Value> {
    let text = if source == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read actions from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read {}", source.display()))?
    };

    let value: Value = serde_json::from_str(&text).context("Actions are not valid JSON")?;
    match value {
        Value::Array(_) => Ok(json!({ "actions": value })),
        Value::Object(_) => Ok(value),
        _ => bail!("Expected an action list or an object with \"actions\""),
    }
}

fn count_deletes(payload: &Value) -> usize {
    payload
        .get("actions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.get("action").and_then(Value::as_str) == Some("delete"))
                .count()
        })
        .unwrap_or(0)
}
