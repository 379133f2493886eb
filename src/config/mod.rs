pub mod paths;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod validate;

mod error;

pub use error::ConfigError;
pub use paths::{ConfigPaths, CONFIG_DIR_ENV, CONFIG_FILE};
pub use reconcile::{force_clear, reconcile, ReconcileReport};
pub use registry::{Provider, CONFIG_KEYS};
pub use store::ConfigStore;
pub use validate::is_valid;


use serde::{Deserialize, Serialize};

/// The single persisted entity, stored as pretty-printed camelCase JSON.
///
/// `api_key` is an opaque credential and is never checked for correctness
/// beyond shape; `language` is free-form. The model fields must belong to
/// the whitelist of the current provider, which `ConfigStore` enforces on
/// every load and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub api_key: String,
    pub api_provider: Provider,
    pub extraction_model: String,
    pub solution_model: String,
    pub debugging_model: String,
    pub language: String,
    pub opacity: f64,
}

impl Default for Config {
    fn default() -> Self {
        let provider = Provider::default();
        Self {
            api_key: String::new(),
            api_provider: provider,
            extraction_model: provider.default_model().to_string(),
            solution_model: provider.default_model().to_string(),
            debugging_model: provider.default_model().to_string(),
            language: default_language(),
            opacity: default_opacity(),
        }
    }
}

/// A partial change to apply through [`store::ConfigStore::update`]. Fields
/// left `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub api_key: Option<String>,
    pub api_provider: Option<Provider>,
    pub extraction_model: Option<String>,
    pub solution_model: Option<String>,
    pub debugging_model: Option<String>,
    pub language: Option<String>,
    pub opacity: Option<f64>,
}

pub(crate) fn clamp_opacity(value: f64) -> f64 {
    value.clamp(0.1, 1.0)
}

fn default_language() -> String {
    "python".to_string()
}

fn default_opacity() -> f64 {
    1.0
}
