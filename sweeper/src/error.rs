use std::{io, path::PathBuf};

use thiserror::Error;

/// Anomalies a sweep step reports upward instead of swallowing.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("storage root {} does not exist", .0.display())]
    MissingRoot(PathBuf),
    #[error("failed to list storage root {}: {source}", .path.display())]
    ListRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
