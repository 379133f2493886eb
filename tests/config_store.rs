use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use codeshade::config::{Config, ConfigPaths, ConfigStore, ConfigUpdate, Provider};

fn store_in(dir: &Path) -> ConfigStore {
    ConfigStore::new(ConfigPaths::new(vec![dir.join("config.json")]))
}

#[test]
fn test_load_creates_default_file() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());

    let config = store.load();
    assert_eq!(config, Config::default());
    assert!(temp.path().join("config.json").exists());

    // The persisted file parses back to the same configuration.
    let text = fs::read_to_string(temp.path().join("config.json"))?;
    let reread: Config = serde_json::from_str(&text)?;
    assert_eq!(reread, config);
    Ok(())
}

#[test]
fn test_save_load_round_trip() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());

    let mut config = store.load();
    config.api_key = "AIzaSyExampleKey".to_string();
    config.language = "rust".to_string();
    config.opacity = 0.7;
    store.save(&config)?;

    assert_eq!(store.load(), config);
    Ok(())
}

#[test]
fn test_load_coerces_unknown_provider_and_models() -> Result<()> {
    let temp = tempfile::tempdir()?;
    fs::write(
        temp.path().join("config.json"),
        r#"{"apiKey":"k","apiProvider":"mistral","extractionModel":"mistral-large","solutionModel":"gemini-2.5-flash","debuggingModel":"whatever","language":"go","opacity":0.4}"#,
    )?;

    let config = store_in(temp.path()).load();
    assert_eq!(config.api_provider, Provider::Gemini);
    assert_eq!(config.extraction_model, "gemini-2.5-pro");
    // Whitelisted values survive sanitization.
    assert_eq!(config.solution_model, "gemini-2.5-flash");
    assert_eq!(config.debugging_model, "gemini-2.5-pro");
    assert_eq!(config.language, "go");
    assert_eq!(config.opacity, 0.4);
    Ok(())
}

#[test]
fn test_load_fills_missing_fields_from_defaults() -> Result<()> {
    let temp = tempfile::tempdir()?;
    fs::write(
        temp.path().join("config.json"),
        r#"{"apiKey":"k","apiProvider":"anthropic"}"#,
    )?;

    let config = store_in(temp.path()).load();
    assert_eq!(config.api_provider, Provider::Anthropic);
    assert_eq!(config.extraction_model, "claude-3-7-sonnet-20250219");
    assert_eq!(config.language, "python");
    assert_eq!(config.opacity, 1.0);
    Ok(())
}

#[test]
fn test_load_rewrites_corrupt_canonical_file() -> Result<()> {
    let temp = tempfile::tempdir()?;
    fs::write(temp.path().join("config.json"), "not json at all")?;

    let store = store_in(temp.path());
    let config = store.load();
    assert_eq!(config, Config::default());

    // The corrupt file was replaced, not left behind.
    let text = fs::read_to_string(temp.path().join("config.json"))?;
    let reread: Config = serde_json::from_str(&text)?;
    assert_eq!(reread, Config::default());
    Ok(())
}

#[test]
fn test_provider_switch_resets_models() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());
    store.load();

    // Stale model values supplied alongside the switch are overridden.
    let config = store.update(ConfigUpdate {
        api_provider: Some(Provider::OpenAi),
        extraction_model: Some("gemini-2.5-flash".to_string()),
        ..Default::default()
    });

    assert_eq!(config.api_provider, Provider::OpenAi);
    assert_eq!(config.extraction_model, "gpt-5");
    assert_eq!(config.solution_model, "gpt-5");
    assert_eq!(config.debugging_model, "gpt-5");
    Ok(())
}

#[test]
fn test_update_infers_provider_from_key_prefix() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());

    let config = store.update(ConfigUpdate {
        api_key: Some(format!("sk-ant-{}", "a".repeat(40))),
        ..Default::default()
    });
    assert_eq!(config.api_provider, Provider::Anthropic);
    assert_eq!(config.extraction_model, "claude-3-7-sonnet-20250219");

    let config = store.update(ConfigUpdate {
        api_key: Some(format!("sk-{}", "a".repeat(40))),
        ..Default::default()
    });
    assert_eq!(config.api_provider, Provider::OpenAi);

    let config = store.update(ConfigUpdate {
        api_key: Some("AIzaSyExampleKey".to_string()),
        ..Default::default()
    });
    assert_eq!(config.api_provider, Provider::Gemini);
    Ok(())
}

#[test]
fn test_explicit_provider_beats_key_inference() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());

    let config = store.update(ConfigUpdate {
        api_key: Some(format!("sk-{}", "a".repeat(40))),
        api_provider: Some(Provider::Anthropic),
        ..Default::default()
    });
    assert_eq!(config.api_provider, Provider::Anthropic);
    Ok(())
}

#[test]
fn test_update_sanitizes_model_fields() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());
    store.load();

    // No provider change; a bogus model silently becomes the default.
    let config = store.update(ConfigUpdate {
        solution_model: Some("gpt-4o".to_string()),
        ..Default::default()
    });
    assert_eq!(config.api_provider, Provider::Gemini);
    assert_eq!(config.solution_model, "gemini-2.5-pro");

    let config = store.update(ConfigUpdate {
        solution_model: Some("gemini-2.5-flash".to_string()),
        ..Default::default()
    });
    assert_eq!(config.solution_model, "gemini-2.5-flash");
    Ok(())
}

#[test]
fn test_opacity_only_update_suppresses_notification() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());

    let notified = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(None::<Config>));
    {
        let notified = notified.clone();
        let seen = seen.clone();
        store.subscribe(move |config| {
            notified.fetch_add(1, Ordering::SeqCst);
            *seen.lock().unwrap() = Some(config.clone());
        });
    }

    store.update(ConfigUpdate {
        opacity: Some(0.5),
        ..Default::default()
    });
    assert_eq!(notified.load(Ordering::SeqCst), 0);

    let config = store.update(ConfigUpdate {
        opacity: Some(0.5),
        language: Some("go".to_string()),
        ..Default::default()
    });
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    // Observers receive the full new configuration.
    assert_eq!(seen.lock().unwrap().as_ref(), Some(&config));
    Ok(())
}

#[test]
fn test_set_opacity_clamps() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());

    assert_eq!(store.set_opacity(5.0).opacity, 1.0);
    assert_eq!(store.opacity(), 1.0);

    assert_eq!(store.set_opacity(-1.0).opacity, 0.1);
    assert_eq!(store.opacity(), 0.1);
    Ok(())
}

#[test]
fn test_language_accessors() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());

    assert_eq!(store.language(), "python");
    store.set_language("typescript");
    assert_eq!(store.language(), "typescript");
    Ok(())
}

#[test]
fn test_has_api_key_trims_whitespace() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let store = store_in(temp.path());

    assert!(!store.has_api_key());

    store.update(ConfigUpdate {
        api_key: Some("   ".to_string()),
        ..Default::default()
    });
    assert!(!store.has_api_key());

    store.update(ConfigUpdate {
        api_key: Some("AIzaSyExampleKey".to_string()),
        ..Default::default()
    });
    assert!(store.has_api_key());
    Ok(())
}

#[test]
fn test_update_survives_persistence_failure() -> Result<()> {
    let temp = tempfile::tempdir()?;
    // The canonical parent is a regular file, so every write must fail.
    let blocked = temp.path().join("blocked");
    fs::write(&blocked, "")?;
    let store = ConfigStore::new(ConfigPaths::new(vec![blocked.join("config.json")]));

    assert!(store.save(&Config::default()).is_err());

    // update logs the failure and still returns the merged configuration.
    let config = store.update(ConfigUpdate {
        language: Some("go".to_string()),
        ..Default::default()
    });
    assert_eq!(config.language, "go");
    Ok(())
}
