use std::fs;
use std::sync::{Mutex, MutexGuard};

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::ConfigError;
use super::paths::ConfigPaths;
use super::registry::Provider;
use super::{clamp_opacity, Config, ConfigUpdate};

type Observer = Box<dyn Fn(&Config) + Send + Sync>;

/// Lenient mirror of the on-disk schema used by `load`. Unknown providers
/// and missing fields are tolerated here; `sanitize` turns the result into
/// a valid `Config` field by field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfig {
    api_key: Option<String>,
    api_provider: Option<String>,
    extraction_model: Option<String>,
    solution_model: Option<String>,
    debugging_model: Option<String>,
    language: Option<String>,
    opacity: Option<f64>,
}

/// The single in-process source of truth for the persisted configuration.
///
/// Constructed once at process start with the resolved paths and passed by
/// reference to consumers. All mutation goes through [`ConfigStore::update`];
/// a mutex serializes the load-modify-save cycle since the underlying file
/// carries no optimistic-concurrency check. Observers registered through
/// [`ConfigStore::subscribe`] are invoked synchronously after persistence.
pub struct ConfigStore {
    paths: ConfigPaths,
    write_lock: Mutex<()>,
    observers: Mutex<Vec<Observer>>,
}

impl ConfigStore {
    pub fn new(paths: ConfigPaths) -> Self {
        Self {
            paths,
            write_lock: Mutex::new(()),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Register an observer for configuration changes. Called with the full
    /// new configuration after every persisted update, except updates that
    /// touched nothing but `opacity`.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&Config) + Send + Sync + 'static,
    {
        self.observers().push(Box::new(observer));
    }

    /// Load the canonical configuration. Never fails: a missing or
    /// unreadable file is replaced with defaults, an unknown provider is
    /// coerced to gemini, and non-whitelisted model fields are substituted
    /// with the provider default.
    pub fn load(&self) -> Config {
        let path = self.paths.canonical();

        if !path.exists() {
            let config = Config::default();
            self.persist_or_log(&config);
            return config;
        }

        let raw = fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str::<RawConfig>(&text).ok());

        match raw {
            Some(raw) => sanitize(raw),
            None => {
                warn!(
                    "config file at {} is corrupt; rewriting defaults",
                    path.display()
                );
                let config = Config::default();
                self.persist_or_log(&config);
                config
            }
        }
    }

    /// Overwrite the canonical file with the full serialized configuration,
    /// creating the directory if needed. The write error is returned rather
    /// than swallowed; `update` and the setters log it and continue.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let path = self.paths.canonical();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Persist {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let body = serde_json::to_string_pretty(config)?;
        fs::write(path, body).map_err(|source| ConfigError::Persist {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    /// The central mutation path. Applies the update policy in order:
    /// provider inference from the key prefix, model resets on a provider
    /// switch, whitelist substitution on the remaining model fields, then a
    /// shallow merge over the current configuration which is persisted and
    /// announced to observers.
    pub fn update(&self, update: ConfigUpdate) -> Config {
        let _guard = self.write_guard();

        // Notification suppression keys off the caller's payload, before
        // inference adds fields: an opacity-only change must not retrigger
        // provider reinitialization downstream.
        let opacity_only = update.opacity.is_some()
            && update.api_key.is_none()
            && update.api_provider.is_none()
            && update.extraction_model.is_none()
            && update.solution_model.is_none()
            && update.debugging_model.is_none()
            && update.language.is_none();

        let current = self.load();
        let mut update = update;

        if update.api_provider.is_none() {
            if let Some(key) = &update.api_key {
                let inferred = Provider::from_key_prefix(key);
                debug!("inferred provider {inferred} from API key prefix");
                update.api_provider = Some(inferred);
            }
        }

        let provider = update.api_provider.unwrap_or(current.api_provider);

        if provider != current.api_provider {
            // A provider switch invalidates every model choice, including
            // ones supplied in this same update.
            update.extraction_model = Some(provider.default_model().to_string());
            update.solution_model = Some(provider.default_model().to_string());
            update.debugging_model = Some(provider.default_model().to_string());
        }

        for slot in [
            &mut update.extraction_model,
            &mut update.solution_model,
            &mut update.debugging_model,
        ] {
            if let Some(model) = slot.take() {
                *slot = Some(provider.sanitize_model(&model));
            }
        }

        let next = Config {
            api_key: update.api_key.unwrap_or(current.api_key),
            api_provider: provider,
            extraction_model: update.extraction_model.unwrap_or(current.extraction_model),
            solution_model: update.solution_model.unwrap_or(current.solution_model),
            debugging_model: update.debugging_model.unwrap_or(current.debugging_model),
            language: update.language.unwrap_or(current.language),
            opacity: update.opacity.map(clamp_opacity).unwrap_or(current.opacity),
        };

        self.persist_or_log(&next);

        if !opacity_only {
            self.notify(&next);
        }

        next
    }

    pub fn has_api_key(&self) -> bool {
        !self.load().api_key.trim().is_empty()
    }

    pub fn opacity(&self) -> f64 {
        self.load().opacity
    }

    pub fn set_opacity(&self, value: f64) -> Config {
        self.update(ConfigUpdate {
            opacity: Some(clamp_opacity(value)),
            ..Default::default()
        })
    }

    pub fn language(&self) -> String {
        self.load().language
    }

    pub fn set_language(&self, value: impl Into<String>) -> Config {
        self.update(ConfigUpdate {
            language: Some(value.into()),
            ..Default::default()
        })
    }

    fn persist_or_log(&self, config: &Config) {
        if let Err(e) = self.save(config) {
            warn!("failed to persist configuration: {e}");
        }
    }

    fn notify(&self, config: &Config) {
        for observer in self.observers().iter() {
            observer(config);
        }
    }

    fn observers(&self) -> MutexGuard<'_, Vec<Observer>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn sanitize(raw: RawConfig) -> Config {
    let defaults = Config::default();

    let provider = raw
        .api_provider
        .as_deref()
        .and_then(Provider::parse)
        .unwrap_or(Provider::Gemini);

    Config {
        api_key: raw.api_key.unwrap_or(defaults.api_key),
        api_provider: provider,
        extraction_model: provider.sanitize_model(
            raw.extraction_model
                .as_deref()
                .unwrap_or(&defaults.extraction_model),
        ),
        solution_model: provider.sanitize_model(
            raw.solution_model
                .as_deref()
                .unwrap_or(&defaults.solution_model),
        ),
        debugging_model: provider.sanitize_model(
            raw.debugging_model
                .as_deref()
                .unwrap_or(&defaults.debugging_model),
        ),
        language: raw.language.unwrap_or(defaults.language),
        opacity: clamp_opacity(raw.opacity.unwrap_or(defaults.opacity)),
    }
}
