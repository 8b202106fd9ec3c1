use crate::config::MirrorConfig;
use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub(crate) fn tracing_log_path() -> PathBuf {
    env::var("NARCISSUS_TRACE_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("narcissus_trace.jsonl"))
}

/// Console events always go to stderr; `--logs` adds a JSON trace file.
pub fn init_tracing(config: &MirrorConfig) {
    let _ = TRACING_INIT.get_or_init(|| {
        let console_level = if config.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        let console = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_filter(console_level);

        let file_enabled = config.logs && !config.no_logs;
        let trace_file = if file_enabled {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(tracing_log_path())
                .ok()
        } else {
            None
        };
        let json = trace_file.map(|file| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false)
                .with_filter(LevelFilter::DEBUG)
        });

        let subscriber = tracing_subscriber::registry().with(console).with(json);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
