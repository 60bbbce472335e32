//! `guichet` — command-line companion for habilitation requests.
//!
//! Reads `config.toml` (or the path specified with `--config`) for the
//! backend address; `GUICHET_*` environment variables override it.
//!
//! # Usage
//!
//! ```
//! guichet changelog before.json after.json
//! guichet show 42
//! guichet list --target-api api_particulier
//! guichet naf 8411Z
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use guichet_client::{ApiClient, ApiConfig, Error};
use guichet_core::{changelog, naf};
use serde_json::{Map, Value, json};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "guichet", about = "Client-side tools for habilitation requests")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Print the human-readable changelog between two enrollment snapshots.
  Changelog {
    /// JSON file holding the earlier snapshot.
    before: PathBuf,
    /// JSON file holding the later snapshot.
    after:  PathBuf,
  },

  /// Fetch an enrollment from the backend and pretty-print it.
  Show { id: u32 },

  /// List enrollments, optionally filtered.
  List {
    /// Restrict to a target API.
    #[arg(long)]
    target_api: Option<String>,

    /// Include archived enrollments.
    #[arg(long)]
    archived: bool,
  },

  /// Check a NAF code against a target API's restriction list.
  Naf {
    code: String,

    /// Target API whose restriction list applies.
    #[arg(long, env = "GUICHET_TARGET_API", default_value = "api_particulier")]
    target_api: String,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command {
    Command::Changelog { before, after } => changelog_command(&before, &after),
    Command::Show { id } => show_command(&cli.config, id).await,
    Command::List { target_api, archived } => {
      list_command(&cli.config, target_api.as_deref(), archived).await
    }
    Command::Naf { code, target_api } => naf_command(&target_api, &code),
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn changelog_command(before: &Path, after: &Path) -> Result<()> {
  let before = read_snapshot(before)?;
  let after = read_snapshot(after)?;

  let diff = changelog::record_diff(&before, &after);
  for entry in changelog::summarize(&diff) {
    println!("{entry}");
  }
  Ok(())
}

async fn show_command(config_path: &Path, id: u32) -> Result<()> {
  let client = build_client(config_path)?;
  let enrollment = client
    .get_user_enrollment(id)
    .await
    .map_err(print_user_messages)?;
  println!("{}", serde_json::to_string_pretty(&enrollment)?);
  Ok(())
}

async fn list_command(
  config_path: &Path,
  target_api: Option<&str>,
  archived: bool,
) -> Result<()> {
  let client = build_client(config_path)?;

  let mut filters = Map::new();
  if let Some(target_api) = target_api {
    filters.insert("target_api".to_string(), json!(target_api));
  }
  filters.insert("archived".to_string(), json!(archived));

  let enrollments = client
    .list_user_enrollments(&filters)
    .await
    .map_err(print_user_messages)?;
  for enrollment in &enrollments {
    println!(
      "{:>6}  {:<16}  {}",
      enrollment.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
      enrollment.target_api,
      enrollment.intitule,
    );
  }
  Ok(())
}

fn naf_command(target_api: &str, code: &str) -> Result<()> {
  if naf::is_valid_naf_code(target_api, Some(code)) {
    println!("{code}: autorisé pour {target_api}");
    Ok(())
  } else {
    bail!("{code}: non autorisé pour {target_api}");
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn read_snapshot(path: &Path) -> Result<Value> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading snapshot {}", path.display()))?;
  serde_json::from_str(&raw)
    .with_context(|| format!("parsing snapshot {}", path.display()))
}

fn build_client(config_path: &Path) -> Result<ApiClient> {
  // Load configuration: file first, then GUICHET_* environment overrides.
  let settings = config::Config::builder()
    .add_source(config::File::from(config_path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("GUICHET"))
    .build()
    .context("failed to read config file")?;

  let api_config: ApiConfig = settings
    .try_deserialize()
    .context("failed to deserialise ApiConfig")?;

  Ok(ApiClient::new(api_config)?)
}

/// Print the error's user-facing messages, then hand back an anyhow error
/// for the exit code.
fn print_user_messages(error: Error) -> anyhow::Error {
  for message in error.user_messages() {
    eprintln!("{message}");
  }
  anyhow::Error::new(error)
}
