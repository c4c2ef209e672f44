//! Loader error types.

use thiserror::Error;

use crate::client::ClientError;
use crate::config::SettingsError;

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors surfaced by a symbol loader.
///
/// Command failures only reach the caller in strict mode; otherwise they
/// are logged and the operation returns no result.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A command or client failure.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The loader was used after [`shutdown`](super::ServerSymbolLoader::shutdown).
    #[error("symbol loader has been shut down")]
    Closed,

    /// The loader could not be built from settings.
    #[error("invalid loader settings: {0}")]
    Settings(#[from] SettingsError),
}

impl LoadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Client(e) if e.is_cancelled())
    }
}
