use anyhow::Result;
use clap::Parser;

use imghost::{app, cli::Cli, init_tracing, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli)?;
    init_tracing(cfg.logging_enabled);
    app::run(cfg).await
}
