use crate::config::LoaderConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "spanner-load")]
#[command(about = "Load a CSV file into a Cloud Spanner table in batches of 500 rows")]
pub struct CliArgs {
    /// Path to TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// CSV file to load, overriding `source.path`
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Read and batch the file without writing to the database; batches print as "Would insert N rows"
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Loads the configuration file, if any, and applies command-line overrides.
    pub fn resolve_config(&self) -> Result<LoaderConfig> {
        let mut config = match &self.config {
            Some(path) => LoaderConfig::from_file(path)?,
            None => LoaderConfig::default(),
        };

        if let Some(source) = &self.source {
            config.source.path = source.clone();
        }

        Ok(config)
    }
}
