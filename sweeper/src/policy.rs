use std::{path::PathBuf, time::Duration};

/// How long a file may go untouched before it is evicted.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// How often a sweep runs.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Static parameters for the sweeper, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Storage root holding one directory per owner.
    pub root: PathBuf,
    /// Retention threshold.
    pub ttl: Duration,
    /// Time between sweeps.
    pub interval: Duration,
}

impl RetentionPolicy {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ttl: DEFAULT_TTL,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}
