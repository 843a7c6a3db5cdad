//! Gradle provisioning CLI
//!
//! Entry point for the `gradle-provision` command-line tool.

use clap::{Parser, Subcommand};
use gradle_provision::cleanup::FenceTimestamp;
use gradle_provision::config::{self, BuiltinDefaults, DEFAULT_CONFIG_FILE};
use gradle_provision::{
    CleanupError, ConfigError, ContextError, EffectiveConfig, ProvisionError, Toolkit,
    VersionError, VersionSpec,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gradle-provision")]
#[command(about = "Provision Gradle distributions and clean Gradle caches in CI jobs", version)]
struct Cli {
    /// Path to config file (default: .github/gradle-provision.toml if present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Never restore from or save to the distribution cache
    #[arg(long, global = true)]
    cache_disabled: bool,

    /// Restore from the distribution cache but never save to it
    #[arg(long, global = true)]
    cache_read_only: bool,

    /// Gradle user home whose caches are cleaned
    #[arg(long, global = true)]
    gradle_user_home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a Gradle version and put it on PATH
    Provision {
        /// Version request: an exact version, current, release-candidate,
        /// nightly, release-nightly, or wrapper
        version: String,
    },

    /// Resolve a version request without installing it
    Resolve {
        version: String,
    },

    /// Gradle user home cache cleanup
    Cleanup {
        #[command(subcommand)]
        action: CleanupCommands,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Subcommand)]
enum CleanupCommands {
    /// Record the cleanup fence at the start of a job
    Prepare,

    /// Evict cache entries not used since the fence
    Run {
        /// Use this fence (milliseconds since the epoch) instead of the recorded one
        #[arg(long)]
        older_than: Option<i64>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Cleanup(#[from] CleanupError),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let effective = load_config(&cli)?;

    if let Commands::Config = cli.command {
        println!("{}", effective.to_json()?);
        return Ok(());
    }

    let toolkit = Toolkit::from_settings(effective.settings()?)?;

    match cli.command {
        Commands::Provision { version } => match toolkit.provisioner().provision(&version)? {
            Some(executable) => println!("{}", executable.display()),
            None => info!("Gradle wrapper requested; nothing to provision"),
        },
        Commands::Resolve { version } => {
            let info = toolkit
                .provisioner()
                .resolver()
                .resolve(&VersionSpec::parse(&version))?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Cleanup { action } => match action {
            CleanupCommands::Prepare => {
                let fence = toolkit.cleaner().prepare()?;
                info!("Recorded cache cleanup fence {}", fence);
            }
            CleanupCommands::Run { older_than: Some(ms) } => {
                toolkit
                    .cleaner()
                    .force_cleanup_files_older_than(FenceTimestamp::from_millis(ms))?;
            }
            CleanupCommands::Run { older_than: None } => toolkit.cleaner().force_cleanup()?,
        },
        Commands::Config => {}
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<EffectiveConfig, CliError> {
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let config_path = match &cli.config {
        Some(path) => Some(path.as_path()),
        None if default_path.exists() => Some(default_path),
        None => None,
    };

    let mut overrides = serde_json::Map::new();
    let mut cache = serde_json::Map::new();
    if cli.cache_disabled {
        cache.insert("disabled".to_string(), true.into());
    }
    if cli.cache_read_only {
        cache.insert("read_only".to_string(), true.into());
    }
    if !cache.is_empty() {
        overrides.insert("cache".to_string(), cache.into());
    }
    if let Some(home) = &cli.gradle_user_home {
        overrides.insert(
            "gradle_user_home".to_string(),
            home.to_string_lossy().to_string().into(),
        );
    }

    Ok(EffectiveConfig::build(
        &BuiltinDefaults::from_env(),
        config_path,
        Some(config::env_overrides()?),
        Some(overrides.into()),
    )?)
}
