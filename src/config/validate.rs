use serde_json::Value;

use super::registry::{Provider, CONFIG_KEYS};

const MODEL_FIELDS: [&str; 3] = ["extractionModel", "solutionModel", "debuggingModel"];

/// Whether a raw JSON value conforms to the current schema.
///
/// Checks short-circuit in order: the key set must match `CONFIG_KEYS`
/// exactly (older schema versions fail here), the provider must be known,
/// and every model field must be whitelisted for that provider. Anything
/// that is not a well-formed object is simply invalid.
pub fn is_valid(raw: &Value) -> bool {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => return false,
    };

    if obj.len() != CONFIG_KEYS.len() || !CONFIG_KEYS.iter().all(|key| obj.contains_key(*key)) {
        return false;
    }

    let provider = match obj
        .get("apiProvider")
        .and_then(Value::as_str)
        .and_then(Provider::parse)
    {
        Some(provider) => provider,
        None => return false,
    };

    MODEL_FIELDS.iter().all(|field| {
        obj.get(*field)
            .and_then(Value::as_str)
            .map(|model| provider.allows(model))
            .unwrap_or(false)
    })
}
