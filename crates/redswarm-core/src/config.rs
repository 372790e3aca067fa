//! Configuration: environment variables, the per-agent tool-server binding
//! file, and the selected model.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Process environment configuration.
#[derive(Clone, Debug)]
pub struct EnvConfig {
    pub debug_mode: bool,
    pub docker_container: String,
    pub chat_height: u16,
    /// Base URL of a remote tool server; unset means in-process tmux pool.
    pub terminal_url: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            debug_mode: std::env::var("DEBUG_MODE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            docker_container: std::env::var("DOCKER_CONTAINER")
                .unwrap_or_else(|_| "attacker".to_string()),
            chat_height: std::env::var("CHAT_HEIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(700),
            terminal_url: std::env::var("REDSWARM_TERMINAL_URL").ok(),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            docker_container: "attacker".to_string(),
            chat_height: 700,
            terminal_url: None,
        }
    }
}

/// One tool-server endpoint an agent is bound to.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct McpServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
}

/// Parsed `mcp_config.json`: agent name → server name → endpoint.
///
/// BTreeMaps keep agent iteration order deterministic for display and
/// prompt composition.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct McpConfig(pub BTreeMap<String, BTreeMap<String, McpServerConfig>>);

impl McpConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Missing file yields an empty binding, matching a fresh checkout.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(_) => Self::default(),
        }
    }

    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|s| s.as_str())
    }

    pub fn servers_for(&self, agent: &str) -> Option<&BTreeMap<String, McpServerConfig>> {
        self.0.get(agent)
    }
}

/// The model the whole swarm runs on; all agents share one provider handle.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub provider: String,
    pub model_name: String,
    pub display_name: String,
    #[serde(default)]
    pub temperature: f32,
}

impl ModelConfig {
    pub fn new(
        provider: impl Into<String>,
        model_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model_name: model_name.into(),
            display_name: display_name.into(),
            temperature: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mcp_config_parses_agent_binding() {
        let raw = r#"{
            "planner": {},
            "reconnaissance": {
                "terminal": {"url": "http://localhost:3003/rpc", "transport": "http"}
            }
        }"#;
        let config: McpConfig = serde_json::from_str(raw).unwrap();
        let agents: Vec<_> = config.agents().collect();
        assert_eq!(agents, vec!["planner", "reconnaissance"]);

        let servers = config.servers_for("reconnaissance").unwrap();
        assert_eq!(
            servers["terminal"].url.as_deref(),
            Some("http://localhost:3003/rpc")
        );
        assert!(config.servers_for("summary").is_none());
    }

    #[test]
    fn model_config_defaults_temperature_to_zero() {
        let config = ModelConfig::new("anthropic", "claude-sonnet-4-20250514", "Claude Sonnet 4");
        assert_eq!(config.temperature, 0.0);
    }
}
