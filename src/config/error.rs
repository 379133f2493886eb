use std::path::PathBuf;

use thiserror::Error;

/// Persistence failures surfaced by [`super::store::ConfigStore::save`].
///
/// Everything else in the store degrades in place: corrupt or missing
/// files become defaults, bad field values are substituted, and the
/// resolver falls back to the working directory. Only the write path
/// reports a typed error, and callers are free to ignore it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write config file at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}
