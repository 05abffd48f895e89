//! Command-line flags.

use clap::Parser;
use std::path::PathBuf;
use wordsearch_core::{ClientConfig, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "wordsearch", version, about = "Build word search puzzles from the terminal")]
pub struct Cli {
    /// Base URL of the puzzle generation service.
    #[arg(long, env = "WORDSEARCH_SERVER")]
    pub server: Option<String>,
    /// Config file to use instead of the default location.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Work against an in-memory backend instead of the service.
    #[arg(long)]
    pub offline: bool,
    /// Directory exported puzzles are written to.
    #[arg(long)]
    pub download_dir: Option<PathBuf>,
}

impl Cli {
    /// Load the config file and apply flag overrides.
    pub fn resolve_config(&self) -> Result<ClientConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load_from(path)?,
            None => ClientConfig::load()?,
        };
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir = Some(dir.clone());
        }
        Ok(config)
    }
}
