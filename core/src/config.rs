use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use retention_sweeper::{policy, RetentionPolicy};
use serde::Deserialize;

use crate::cli::Cli;

/// Runtime configuration resolved from file, env and CLI.
#[derive(Clone, Debug)]
pub struct Config {
    /// Storage root; each owner gets one directory beneath it.
    pub data_dir: PathBuf,
    /// Files untouched for longer than this are evicted.
    pub ttl: Duration,
    /// Time between retention sweeps.
    pub sweep_interval: Duration,
    /// Whether info-level logging is enabled.
    pub logging_enabled: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    storage: FileStorage,
    #[serde(default)]
    retention: FileRetention,
    #[serde(default)]
    logging: FileLogging,
}

#[derive(Deserialize)]
struct FileStorage {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
}

#[derive(Deserialize)]
struct FileRetention {
    #[serde(default = "default_ttl_secs")]
    ttl_secs: u64,
    #[serde(default = "default_interval_secs")]
    interval_secs: u64,
}

#[derive(Deserialize)]
struct FileLogging {
    #[serde(default = "default_logging")]
    enabled: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/data")
}

fn default_ttl_secs() -> u64 {
    policy::DEFAULT_TTL.as_secs()
}

fn default_interval_secs() -> u64 {
    policy::DEFAULT_INTERVAL.as_secs()
}

/// Upper bound for the ttl and interval settings: ten years.
const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn default_logging() -> bool {
    true
}

impl Default for FileStorage {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for FileRetention {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for FileLogging {
    fn default() -> Self {
        Self {
            enabled: default_logging(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Resolve configuration from CLI, environment variables, config file and defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        // config file path precedence: CLI -> ENV -> default
        let config_path = cli
            .config
            .clone()
            .or_else(|| std::env::var("IMGHOST_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("config/imghost.toml"));

        let file_cfg = match fs::read(&config_path) {
            Ok(bytes) => {
                let contents = String::from_utf8_lossy(&bytes);
                toml::from_str::<FileConfig>(&contents)
                    .with_context(|| format!("invalid config file {}", config_path.display()))?
            }
            Err(_) => FileConfig::default(),
        };

        let mut data_dir = file_cfg.storage.data_dir;
        let mut ttl_secs = file_cfg.retention.ttl_secs;
        let mut interval_secs = file_cfg.retention.interval_secs;
        let mut logging = file_cfg.logging.enabled;

        // environment overrides
        if let Ok(dir) = std::env::var("IMGHOST_DATA_DIR") {
            data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = env_parse("IMGHOST_TTL_SECS") {
            ttl_secs = secs;
        }
        if let Some(secs) = env_parse("IMGHOST_INTERVAL_SECS") {
            interval_secs = secs;
        }
        if let Some(l) = env_parse("IMGHOST_LOGGING") {
            logging = l;
        }

        // CLI overrides
        if let Some(dir) = &cli.data_dir {
            data_dir = dir.clone();
        }
        if let Some(l) = cli.logging {
            logging = l;
        }

        if ttl_secs == 0 {
            anyhow::bail!("retention ttl must be non-zero");
        }
        if interval_secs == 0 {
            anyhow::bail!("sweep interval must be non-zero");
        }
        if ttl_secs > MAX_DURATION_SECS {
            anyhow::bail!("retention ttl must be at most {MAX_DURATION_SECS} seconds");
        }
        if interval_secs > MAX_DURATION_SECS {
            anyhow::bail!("sweep interval must be at most {MAX_DURATION_SECS} seconds");
        }

        Ok(Self {
            data_dir,
            ttl: Duration::from_secs(ttl_secs),
            sweep_interval: Duration::from_secs(interval_secs),
            logging_enabled: logging,
        })
    }

    /// Sweeper parameters derived from this configuration.
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::new(&self.data_dir)
            .with_ttl(self.ttl)
            .with_interval(self.sweep_interval)
    }
}
