//! Telemetry helpers for structured logging and tracing.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, Registry};

use crate::core::AppResult;

/// Initialize tracing/telemetry. Users can install their own subscriber; this
/// helper installs a default env-based subscriber if none is set.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Something whose log verbosity can be flipped at runtime.
pub trait VerbosityToggle {
    /// Flip debug output; returns whether debug is now enabled.
    fn toggle_debug(&self) -> bool;
}

/// Handle to the global subscriber installed by [`LogControl::install`].
pub struct LogControl {
    handle: reload::Handle<LevelFilter, Registry>,
    debug: AtomicBool,
}

impl LogControl {
    /// Install the global subscriber.
    ///
    /// Logs go to `log_file` when given (truncated unless `append`), to
    /// stderr otherwise. `debug` selects the initial level.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or a subscriber is already set.
    pub fn install(debug: bool, log_file: Option<&Path>, append: bool) -> AppResult<Self> {
        let (filter, handle) = reload::Layer::new(level_for(debug));
        let registry = tracing_subscriber::registry().with(filter);

        match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(append)
                    .truncate(!append)
                    .open(path)?;
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                    .try_init()?;
            }
            None => registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()?,
        }

        Ok(Self {
            handle,
            debug: AtomicBool::new(debug),
        })
    }

    /// Whether debug output is currently enabled.
    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Acquire)
    }
}

impl VerbosityToggle for LogControl {
    fn toggle_debug(&self) -> bool {
        let enabled = !self.debug.fetch_xor(true, Ordering::AcqRel);
        if let Err(error) = self.handle.modify(|level| *level = level_for(enabled)) {
            warn!(%error, "failed to change log level");
        }
        enabled
    }
}

const fn level_for(debug: bool) -> LevelFilter {
    if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}
