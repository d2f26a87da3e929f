pub mod config;

use std::{fs::OpenOptions, sync::Mutex};

pub use tracing::{
    debug, debug_span, error, error_span, event, info, info_span, span, trace, trace_span, warn,
    warn_span, Level, Subscriber,
};
use tracing_subscriber::{
    filter::ParseError, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use self::config::LogConfig;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("cannot open log file {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

/// `RUST_LOG` wins over the configured level.
fn filter(level: &str) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))
}

impl LogConfig {
    /// Replaces the console level when one is given on the command line.
    pub fn with_console_level(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.console_level = level;
        }
        self
    }

    /// Installs the global subscriber: human readable lines on stderr, so
    /// that stdout stays machine readable, plus JSON lines appended to
    /// `file` when set.
    ///
    /// Only the first successful call installs anything; later calls still
    /// validate their filters and log file.
    pub fn init(&self) -> Result<(), LogError> {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(filter(&self.console_level)?);

        let file_layer = match &self.file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| LogError::File {
                        path: path.clone(),
                        source,
                    })?;
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_filter(filter(&self.file_level)?);
                Some(layer)
            }
            None => None,
        };

        // a subscriber is already installed
        let _ = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init();
        Ok(())
    }
}
