//! Fetch orchestration.
//!
//! The update entrypoint, the fetch command/result types, and the scheduler
//! and error-handler collaborator traits it talks to.

mod command;
mod error_handler;
mod scheduler;
mod update;

pub use command::{FetchCommand, FetchError, FetchResult, FetchedMesh};
pub use error_handler::{LoggingErrorHandler, TileErrorHandler, MAX_RETRY};
pub use scheduler::{FetchScheduler, QueueScheduler};
pub use update::{FeatureUpdater, UpdateContext, UpdateOutcome, View};
