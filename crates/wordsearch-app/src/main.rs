//! Main application entry point.

use clap::Parser;
use wordsearch_app::{Cli, Shell, connect};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    log::info!("Starting wordsearch");

    let backend = connect(cli.offline, &config)?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let local = tokio::task::LocalSet::new();
    let shell = Shell::new(backend, config, Shell::spawn_stdin_reader());
    local.block_on(&runtime, shell.run())?;
    Ok(())
}
