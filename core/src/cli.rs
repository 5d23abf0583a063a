use clap::Parser;
use std::path::PathBuf;

/// Command line interface for the imghost service.
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override the storage root holding one directory per owner.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Enable or disable logging (true/false).
    #[arg(long)]
    pub logging: Option<bool>,
}
