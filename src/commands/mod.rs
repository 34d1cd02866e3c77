//! Command layer: one function per CLI subcommand, each orchestrating the
//! configuration store, the metadata client and the storage services.

mod configure;
mod connection;
mod export;
mod list;
mod prompt;
mod search;

pub use configure::{ConfigureArgs, configure};
pub use connection::test_connection;
pub use export::{DEFAULT_EXPORT_DIR, ExportArgs, export};
pub use list::{ListArgs, list};
pub use prompt::{ABORT_INPUT, Console};
pub use search::{SearchArgs, search};

use crate::config::{API_KEY_ENV, ConfigStore};
use crate::{Error, Result};

/// Resolve the API key or explain how to set one
pub fn require_api_key(store: &ConfigStore) -> Result<String> {
    store.get_api_key().ok_or_else(|| {
        Error::config(format!(
            "No API key configured. Run `filmstash configure --api-key <KEY>` or set {API_KEY_ENV}"
        ))
    })
}
