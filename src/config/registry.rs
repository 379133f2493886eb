use serde::{Deserialize, Serialize};
use std::fmt;

/// The exact key set of the persisted schema, in file order.
///
/// The validator checks stored files against this set, so adding or
/// renaming a field here automatically invalidates every older file.
pub const CONFIG_KEYS: [&str; 7] = [
    "apiKey",
    "apiProvider",
    "extractionModel",
    "solutionModel",
    "debuggingModel",
    "language",
    "opacity",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    #[default]
    Gemini,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Gemini, Provider::Anthropic];

    /// Ordered model whitelist for this provider. The first entry is the
    /// default used for substitution and provider-switch resets.
    /// Update as providers evolve.
    pub fn models(self) -> &'static [&'static str] {
        match self {
            Provider::OpenAi => &["gpt-5", "gpt-5-mini", "gpt-5-nano"],
            Provider::Gemini => &["gemini-2.5-pro", "gemini-2.5-flash"],
            Provider::Anthropic => &[
                "claude-3-7-sonnet-20250219",
                "claude-3-5-sonnet-20241022",
                "claude-3-opus-20240229",
            ],
        }
    }

    pub fn default_model(self) -> &'static str {
        self.models()[0]
    }

    pub fn allows(self, model: &str) -> bool {
        self.models().contains(&model)
    }

    /// Keep `model` if whitelisted, otherwise substitute the provider default.
    pub fn sanitize_model(self, model: &str) -> String {
        if self.allows(model) {
            model.to_string()
        } else {
            self.default_model().to_string()
        }
    }

    pub fn parse(s: &str) -> Option<Provider> {
        match s {
            "openai" => Some(Provider::OpenAi),
            "gemini" => Some(Provider::Gemini),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Infer the provider from the literal prefix of an API key.
    /// `sk-ant-` keys are Anthropic, other `sk-` keys are OpenAI,
    /// anything else is treated as Gemini.
    pub fn from_key_prefix(key: &str) -> Provider {
        if key.starts_with("sk-ant-") {
            Provider::Anthropic
        } else if key.starts_with("sk-") {
            Provider::OpenAi
        } else {
            Provider::Gemini
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
