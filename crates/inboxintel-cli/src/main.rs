mod analyze;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inboxintel_core::{AppConfig, ConfigError, ScoringPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "inboxintel-cli")]
#[command(about = "Competitor email campaign intelligence")]
struct Cli {
    /// Scoring policy YAML file; overrides `INBOXINTEL_POLICY_PATH`
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build an intelligence report from a campaign file
    Analyze {
        /// Campaign file (`.json`, or YAML for any other extension)
        #[arg(long)]
        input: PathBuf,

        /// Brand name; overrides the `brand` field of the input file
        #[arg(long)]
        brand: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },
    /// Score each campaign in a file without aggregating
    Score {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the effective scoring policy as YAML
    Policy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = inboxintel_core::load_app_config();
    let log_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("inboxintel-cli: run with --help to list commands");
        return Ok(());
    };

    let path = policy_path(cli.policy, config)?;
    let policy = resolve_policy(path.as_deref())?;

    match command {
        Commands::Analyze {
            input,
            brand,
            format,
        } => analyze::run_analyze(&input, brand.as_deref(), format, &policy)?,
        Commands::Score { input } => analyze::run_score(&input, &policy)?,
        Commands::Policy => {
            print!("{}", serde_yaml::to_string(&policy)?);
        }
    }

    Ok(())
}

/// Pick the policy file: the `--policy` flag wins, otherwise the environment.
///
/// The environment is only consulted when no flag is given, so a bad
/// `INBOXINTEL_*` variable does not block an explicit `--policy`.
fn policy_path(
    flag: Option<PathBuf>,
    config: Result<AppConfig, ConfigError>,
) -> anyhow::Result<Option<PathBuf>> {
    match flag {
        Some(path) => Ok(Some(path)),
        None => Ok(config.context("loading INBOXINTEL_* configuration")?.policy_path),
    }
}

/// Load the policy file if one is configured, otherwise use the defaults.
fn resolve_policy(path: Option<&Path>) -> anyhow::Result<ScoringPolicy> {
    match path {
        Some(path) => {
            let policy = inboxintel_core::load_policy(path)
                .with_context(|| format!("loading scoring policy from {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded scoring policy");
            Ok(policy)
        }
        None => Ok(ScoringPolicy::default()),
    }
}
