//! Background retention sweeper for a per-owner file store.
//!
//! The store is laid out as `root/<owner>/<file>`. On every tick the
//! [`Sweeper`] evicts files whose modification time is older than the
//! retention threshold and then removes owner directories left empty.
//! Every step tolerates concurrent uploads and deletes from the serving
//! path, so nothing here ever takes a lock.

pub mod error;
pub mod evict;
pub mod policy;
pub mod reclaim;
pub mod scheduler;

pub use error::SweepError;
pub use evict::{evict_stale, EvictReport};
pub use policy::RetentionPolicy;
pub use reclaim::{reclaim_empty, ReclaimReport};
pub use scheduler::{SweepReport, Sweeper};
