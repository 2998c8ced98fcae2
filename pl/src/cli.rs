//! CLI argument parsing for pl

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::options::PartialsOptions;

#[derive(Parser, Debug)]
#[command(name = "pl")]
#[command(author, version, about = "Discover and register template partials", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the partial names that would be registered, without an engine
    List {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Register partials with Handlebars, failing on templates it rejects
    Load {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Loader settings that override the config file
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Template root directory (repeatable)
    #[arg(short, long = "root")]
    pub roots: Vec<String>,

    /// Partial directory name, `.` for the root itself (repeatable)
    #[arg(short, long = "name")]
    pub names: Vec<String>,

    /// Partial file extension without the dot (repeatable)
    #[arg(short, long = "ext")]
    pub extensions: Vec<String>,

    /// Separator between path components in partial names
    #[arg(short, long)]
    pub delimiter: Option<String>,
}

impl SourceArgs {
    /// Options set on the command line; unset flags stay unset
    pub fn to_options(&self) -> PartialsOptions {
        PartialsOptions {
            root_directories: non_empty(&self.roots),
            partial_directory_names: non_empty(&self.names),
            extensions: non_empty(&self.extensions),
            delimiter: self.delimiter.clone().map(Into::into),
        }
    }
}

fn non_empty(values: &[String]) -> Option<serde_yaml::Value> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec().into())
    }
}
