pub mod client;
pub mod probe;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use report::emit as emit_report;
pub use runner::run_session;
pub use utils::config::HarnessConfig;
