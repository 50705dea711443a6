pub mod file_sink;
pub mod http_api;

/// Re-export commonly used types from adapters
pub use file_sink::FileSnapshotSink;
pub use http_api::{AppState, router};
