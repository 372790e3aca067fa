//! Model catalog and provider construction
//!
//! A static table of known models per provider. Availability is decided by
//! the provider's API key env var; Ollama has no key and is always listed.

use crate::anthropic::AnthropicProvider;
use crate::openai::OpenAiProvider;
use crate::provider::LlmProvider;
use redswarm_core::{Error, ModelConfig, Result};
use std::sync::Arc;

struct CatalogEntry {
    provider: &'static str,
    model_name: &'static str,
    display_name: &'static str,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        provider: "anthropic",
        model_name: "claude-sonnet-4-20250514",
        display_name: "Claude Sonnet 4",
    },
    CatalogEntry {
        provider: "anthropic",
        model_name: "claude-haiku-4-5-20251001",
        display_name: "Claude Haiku 4.5",
    },
    CatalogEntry {
        provider: "openai",
        model_name: "gpt-4o",
        display_name: "GPT-4o",
    },
    CatalogEntry {
        provider: "openai",
        model_name: "gpt-4o-mini",
        display_name: "GPT-4o Mini",
    },
    CatalogEntry {
        provider: "deepseek",
        model_name: "deepseek-chat",
        display_name: "DeepSeek Chat",
    },
    CatalogEntry {
        provider: "groq",
        model_name: "llama-3.3-70b-versatile",
        display_name: "Llama 3.3 70B (Groq)",
    },
    CatalogEntry {
        provider: "ollama",
        model_name: "llama3.1:8b",
        display_name: "Llama 3.1 8B (Ollama)",
    },
];

/// Env var carrying the API key for a provider; `None` means no key needed.
pub fn api_key_var(provider: &str) -> Option<&'static str> {
    match provider {
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "deepseek" => Some("DEEPSEEK_API_KEY"),
        "groq" => Some("GROQ_API_KEY"),
        "ollama" => None,
        _ => Some("LLM_API_KEY"),
    }
}

fn base_url(provider: &str) -> &'static str {
    match provider {
        "openai" => "https://api.openai.com/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        _ => "http://localhost:11434/v1",
    }
}

fn key_for(provider: &str) -> Option<String> {
    api_key_var(provider)
        .and_then(|var| std::env::var(var).ok())
        .filter(|key| !key.is_empty() && key != "your-api-key")
}

/// A catalog entry plus whether it can actually be used right now.
#[derive(Clone, Debug)]
pub struct AvailableModel {
    pub config: ModelConfig,
    pub api_key_available: bool,
}

pub fn list_available_models() -> Vec<AvailableModel> {
    CATALOG
        .iter()
        .map(|entry| AvailableModel {
            config: ModelConfig::new(entry.provider, entry.model_name, entry.display_name),
            api_key_available: api_key_var(entry.provider)
                .map(|_| key_for(entry.provider).is_some())
                .unwrap_or(true),
        })
        .collect()
}

/// Construct the provider a `ModelConfig` names. Fails fast with
/// `ConfigMissing` when the key is absent — the startup contract.
pub fn build_provider(config: &ModelConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.provider.as_str() {
        "anthropic" => {
            let key = key_for("anthropic")
                .ok_or_else(|| Error::config_missing("ANTHROPIC_API_KEY"))?;
            Ok(Arc::new(AnthropicProvider::new(key)))
        }
        "ollama" => Ok(Arc::new(OpenAiProvider::new(
            "ollama",
            None,
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| base_url("ollama").to_string()),
        ))),
        provider => {
            let var = api_key_var(provider).unwrap_or("LLM_API_KEY");
            let key = key_for(provider).ok_or_else(|| Error::config_missing(var))?;
            Ok(Arc::new(OpenAiProvider::new(
                provider.to_string(),
                Some(key),
                base_url(provider),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_provider_once_at_least() {
        let models = list_available_models();
        for provider in ["anthropic", "openai", "deepseek", "groq", "ollama"] {
            assert!(
                models.iter().any(|m| m.config.provider == provider),
                "missing provider {}",
                provider
            );
        }
    }

    #[test]
    fn ollama_needs_no_key() {
        assert!(api_key_var("ollama").is_none());
        let models = list_available_models();
        let ollama = models
            .iter()
            .find(|m| m.config.provider == "ollama")
            .unwrap();
        assert!(ollama.api_key_available);
    }
}
