//! `ethoinfo` — declare the primate-observation schema and hand it off.
//!
//! Reads `ethoinfo.toml` (or the path given with `--config`), builds the
//! schema registry, and either checks it, describes it as JSON, or runs the
//! bundled reporting runtime against it. A schema that fails to seal aborts
//! with the validation error; nothing runs on a corrupt schema.

mod report;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ethoinfo_core::registry::{SchemaBundle, SchemaRegistry};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, filter::Directive};

use crate::report::ReportRuntime;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Primate-observation schema registrar")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ethoinfo.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Build and seal the schema; exit non-zero if validation fails.
  Check,
  /// Print the sealed schema bundle as JSON.
  Describe {
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
  },
  /// Seal the schema and hand it to the reporting runtime.
  Run,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file; every key also accepts an
/// `ETHOINFO_*` environment override. CLI flags win over both.
#[derive(Debug, Default, Deserialize)]
struct Settings {
  /// Pretty-print `describe` output by default.
  #[serde(default)]
  pretty: bool,
  /// Default log filter directive (e.g. `"debug"`). `RUST_LOG` still wins.
  #[serde(default)]
  log:    Option<String>,
}

/// Layer the config file under the `ETHOINFO_*` environment.
fn load_settings(path: &Path) -> anyhow::Result<Settings> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("ETHOINFO"))
    .build()
    .context("failed to read config file")?;
  settings.try_deserialize().context("failed to deserialise settings")
}

/// The filter directive used when `RUST_LOG` is unset: the configured `log`
/// setting, or INFO.
fn default_directive(settings: &Settings) -> anyhow::Result<Directive> {
  match settings.log.as_deref() {
    Some(directive) => directive
      .parse()
      .with_context(|| format!("invalid log directive {directive:?}")),
    None => Ok(LevelFilter::INFO.into()),
  }
}

/// The `describe` flag wins over the config file.
fn resolve_pretty(flag: bool, settings: &Settings) -> bool {
  flag || settings.pretty
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // Load configuration before tracing so the `log` setting can seed the
  // filter; the environment still overrides it.
  let settings = load_settings(&cli.config)?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_directive(&settings)?)
        .from_env_lossy(),
    )
    .init();

  let bundle = seal_schema()?;

  match cli.command {
    Command::Check => {
      // Reaching this point means the schema sealed; report and exit.
      let count = bundle.domains().count();
      println!("schema valid: {count} domains");
    }
    Command::Describe { pretty } => {
      let json = if resolve_pretty(pretty, &settings) {
        bundle.to_json_pretty()?
      } else {
        bundle.to_json()?
      };
      println!("{json}");
    }
    Command::Run => {
      bundle.run(ReportRuntime)?;
    }
  }

  Ok(())
}

/// Declare both domains and seal the registry. Declaration order matters
/// only in that the encounter domain must exist before it is nested.
fn seal_schema() -> anyhow::Result<SchemaBundle> {
  let mut registry = SchemaRegistry::new();
  ethoinfo_primates::install(&mut registry)
    .context("declaring observation domains")?;
  registry.seal().context("sealing schema")
}
