pub mod csv_row;
pub mod error;
pub mod executor;
pub mod pending_batch;
pub mod progress_tracker;

pub use error::{ImportError, ImportFailure};
pub use executor::ImportExecutor;
pub use progress_tracker::ProgressTracker;
