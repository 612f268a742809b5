pub mod progress;
pub mod request;
pub mod response;

pub use progress::{ImportProgress, ImportStatus};
pub use request::ImportRequest;
pub use response::{ImportReport, SkipReason, SkippedRow};
