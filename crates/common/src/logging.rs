//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level. When a log file is
//! configured, output goes there (appending) instead of stderr so that
//! command output on stdout stays machine-readable.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber described by `config`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let log_file = config.file.as_deref().and_then(open_log_file);

    match log_file {
        Some(file) => install(config, Mutex::new(file)),
        None => install(config, std::io::stderr),
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

fn install<W>(config: &LoggingConfig, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(writer);

    if config.json {
        let subscriber = builder.json().finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = builder
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("posehue: cannot open log file {}: {e}", path.display());
            None
        }
    }
}
