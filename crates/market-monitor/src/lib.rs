//! Logging setup and status reporting.

mod logging;
mod report;

pub use logging::setup_logging;
pub use report::{render_status, summary_line};
