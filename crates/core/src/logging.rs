// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/logging.rs
//
// Process-wide info logger used by every helper in this workspace.
//
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

#[doc(hidden)]
pub use tracing as __tracing;

/// The one capability the helpers need from a logger.
pub trait InfoLog: Send + Sync {
    fn info(&self, message: &str);
}

/// Logger that forwards to `tracing` at INFO level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl InfoLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

static LOGGER: OnceLock<Box<dyn InfoLog>> = OnceLock::new();

/// Install the process-wide logger. Call once at start-up.
///
/// A logger can only be installed once; on a second call the rejected
/// logger is handed back.
pub fn install_logger(logger: Box<dyn InfoLog>) -> Result<(), Box<dyn InfoLog>> {
    LOGGER.set(logger)
}

/// The logger passed to [`install_logger`], if any.
pub fn installed_logger() -> Option<&'static dyn InfoLog> {
    LOGGER.get().map(|l| &**l)
}

/// Send a formatted info line to the installed logger.
///
/// With no logger installed the line becomes a `tracing` INFO event whose
/// target is the calling module, so `RUST_LOG=artifact_io_storage=info`
/// selects storage events only.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {{
        let message = ::std::format!($($arg)+);
        match $crate::logging::installed_logger() {
            ::std::option::Option::Some(logger) => logger.info(&message),
            ::std::option::Option::None => $crate::logging::__tracing::info!("{}", message),
        }
    }};
}

/// Install a `tracing-subscriber` fmt subscriber for binaries and scripts
/// that use these helpers. `RUST_LOG` takes precedence when set.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!("artifact_io_core={level},artifact_io_storage={level}"))
        });
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
