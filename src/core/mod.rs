//! Core infrastructure module for confmetrics.
//!
//! - [`types`]: row ids, class indices and the ordered [`LabelTable`]
//! - [`constants`]: defaults, table and column names
//! - [`error`]: the [`MetricsError`] taxonomy and the crate [`Result`]

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{MetricsError, Result};
pub use types::*;

use std::sync::Once;

static LOGGING_INIT: Once = Once::new();

/// Initialize the logging subsystem.
///
/// Installs `env_logger` with an `info` default filter when `RUST_LOG` is
/// unset. Safe to call repeatedly; only the first call has an effect, and an
/// already installed logger is left alone.
pub fn initialize_core() -> Result<()> {
    LOGGING_INIT.call_once(|| {
        let env = env_logger::Env::default().default_filter_or("info");
        // Another logger may already be installed by the host application.
        let _ = env_logger::Builder::from_env(env).try_init();
        log::debug!("confmetrics {} initialized", CONFMETRICS_VERSION);
    });
    Ok(())
}

/// Whether [`initialize_core`] has run
pub fn is_core_initialized() -> bool {
    LOGGING_INIT.is_completed()
}
