//! KYCFlow CLI
//!
//! Command-line driver for the KYCFlow form engine.
//!
//! # Usage
//!
//! ```bash
//! kycflow countries
//! kycflow show NL
//! kycflow fill NL --set bsn=123456789 --format json
//! kycflow fill US --set first_name=Ada --set age=17 --policy immediate
//! kycflow check ./schemas/be.yaml
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use kycflow_core::{Engine, EngineConfig, SessionPolicy, StaticProfileSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "kycflow")]
#[command(author = "KYCFlow")]
#[command(version)]
#[command(about = "KYCFlow dynamic KYC forms", long_about = None)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, short, env = "KYCFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    /// Validation policy, overrides the configuration
    #[arg(long)]
    policy: Option<PolicyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    SubmitTime,
    Immediate,
}

impl From<PolicyArg> for SessionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::SubmitTime => SessionPolicy::SubmitTime,
            PolicyArg::Immediate => SessionPolicy::Immediate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List countries with a form
    Countries,
    /// Load a country's form and show its fields
    Show { country: String },
    /// Fill in and submit a country's form
    Fill {
        country: String,
        /// Field value as id=value, repeatable
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
        /// JSON object served as the user profile
        #[arg(long)]
        profile_file: Option<PathBuf>,
    },
    /// Decode a schema document and report problems
    Check { file: PathBuf },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => Ok((id.trim().to_string(), value.to_string())),
        _ => Err(format!("expected id=value, got `{}`", s)),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kycflow").join("config.toml"))
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(policy) = cli.policy {
        config.session_policy = policy.into();
    }
    Ok(config)
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli, config: EngineConfig) -> anyhow::Result<()> {
    let engine = Engine::from_config(&config)?;
    tracing::debug!(policy = %engine.policy(), "engine ready");

    match cli.command {
        Commands::Countries => commands::countries::handle(&engine, cli.format).await,
        Commands::Show { country } => commands::form::show(&engine, &country, cli.format).await,
        Commands::Fill {
            country,
            values,
            profile_file,
        } => {
            let engine = match profile_file {
                Some(path) => {
                    let json = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    engine.with_profile_source(Arc::new(StaticProfileSource::from_json_str(&json)?))
                }
                None => engine,
            };
            commands::form::fill(&engine, &country, &values, cli.format).await
        }
        Commands::Check { file } => commands::schema::check(&file, cli.format).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(2);
        }
    };
    init_tracing(&config.log_filter);

    if let Err(e) = run(cli, config).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
