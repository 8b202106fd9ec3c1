pub mod bridge;
pub mod camera;
pub mod collaborators;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod interpreter;
mod lock;
mod logging;
pub mod runtime;
pub mod stream;
mod telemetry;
#[cfg(test)]
mod test_support;
pub mod vision;
pub mod voice;

pub(crate) use lock::lock_or_recover;
pub use logging::{
    content_logging_enabled, crash_log_path, init_logging, log_debug, log_debug_content,
    log_file_path, log_panic,
};
pub use telemetry::init_tracing;
