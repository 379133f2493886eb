use anyhow::Result;
use clap::Args;

use codeshade::config::{reconcile, ConfigPaths, ConfigStore, Provider};
use codeshade::providers::{is_valid_key_format, KeyTester};

#[derive(Args)]
pub struct TestKeyArgs {
    /// Key to check; defaults to the stored key
    #[arg(long)]
    pub key: Option<String>,

    /// Provider (openai, gemini, anthropic); inferred from the key when omitted
    #[arg(long)]
    pub provider: Option<String>,
}

pub async fn run(args: TestKeyArgs) -> Result<()> {
    let provider = args
        .provider
        .as_deref()
        .map(|p| Provider::parse(p).ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", p)))
        .transpose()?;

    let key = match args.key {
        Some(key) => key,
        None => {
            let paths = ConfigPaths::resolve();
            reconcile(&paths);
            let store = ConfigStore::new(paths);
            let stored = store.load().api_key;
            if stored.trim().is_empty() {
                anyhow::bail!("no API key stored; pass one with --key or set apiKey first");
            }
            stored
        }
    };

    let effective = provider.unwrap_or_else(|| Provider::from_key_prefix(&key));

    if !is_valid_key_format(&key, Some(effective)) {
        println!("warning: key does not look like a {effective} key; checking anyway");
    }

    match KeyTester::new().test_key(&key, Some(effective)).await {
        Ok(()) => {
            println!("API key accepted by {effective}");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(e)),
    }
}
