use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use handlebars::Handlebars;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use partialsloader::cli::{Cli, Command, SourceArgs};
use partialsloader::config::Config;
use partialsloader::{PartialRegistry, PartialsLoader, PartialsOptions, Recorder};

type LogHandle = reload::Handle<EnvFilter, Registry>;

fn parse_level(s: &str) -> tracing::Level {
    match s.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }
    }
}

fn env_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level.into())
}

/// Install the subscriber before the config file is read
///
/// Uses the --log-level flag, or INFO. The filter sits behind a reload
/// layer so `apply_config_log_level` can raise or lower it afterwards.
fn setup_logging(cli_log_level: Option<&str>) -> Result<LogHandle> {
    let level = cli_log_level.map(parse_level).unwrap_or(tracing::Level::INFO);
    let (filter, handle) = reload::Layer::new(env_filter(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install subscriber: {}", e))?;
    Ok(handle)
}

fn apply_config_log_level(handle: &LogHandle, cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: --log-level > config file > INFO
    if cli_log_level.is_some() {
        return Ok(());
    }
    if let Some(level) = config_log_level {
        handle
            .reload(env_filter(parse_level(level)))
            .map_err(|e| eyre::eyre!("Failed to apply config log-level: {}", e))?;
        debug!(%level, "apply_config_log_level: using config file level");
    }
    Ok(())
}

fn options_for(source: &SourceArgs, config: &Config) -> PartialsOptions {
    let options = source.to_options().or(config.options());
    debug!(?options, "options_for: merged command line and config");
    options
}

fn load_into(engine: &mut dyn PartialRegistry, options: &PartialsOptions) -> Result<Vec<partialsloader::RegisteredPartial>> {
    let mut recorder = Recorder::new(engine);
    PartialsLoader::new()
        .load(Some(&mut recorder), options)
        .context("Failed to load partials")?;
    Ok(recorder.into_registered())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_handle = setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_config_log_level(&log_handle, cli.log_level.as_deref(), config.log_level.as_deref())?;

    info!("pl starting");

    match cli.command {
        Command::List { source } => {
            let options = options_for(&source, &config);
            let mut calls: Vec<(String, String)> = Vec::new();
            let registered = load_into(&mut calls, &options)?;

            for partial in &registered {
                println!("{} {}", partial.name.cyan(), format!("({} bytes)", partial.bytes).dimmed());
            }
            println!("{} {} partial(s) found", "✓".green(), registered.len());
        }
        Command::Load { source } => {
            let options = options_for(&source, &config);
            let mut hbs = Handlebars::new();
            let registered = load_into(&mut hbs, &options)?;

            for partial in &registered {
                println!("{}", partial.name.cyan());
            }
            println!("{} Registered {} partial(s) with Handlebars", "✓".green(), registered.len());
        }
    }

    Ok(())
}
