//! Provider configuration persistence and selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{LLMConfigUpdate, LLMProvider, ResolvedProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Stored provider configuration (persisted to llm-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_preferred(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: default_openai_model(),
            anthropic_model: default_anthropic_model(),
            groq_model: default_groq_model(),
            config_path: PathBuf::new(),
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Load config from file, filling missing keys from `lookup`.
    pub fn load_with<F>(config_path: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: LLMConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        config.config_path = config_path.to_path_buf();

        if config.openai_api_key.is_none() {
            config.openai_api_key = lookup("OPENAI_API_KEY");
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = lookup("ANTHROPIC_API_KEY");
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = lookup("GROQ_API_KEY");
        }

        config
    }

    /// Save config to disk.
    pub fn save(&self) -> healthplan_core::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved LLM config to {}", self.config_path.display());
        Ok(())
    }

    /// Apply an update, merging with existing config.
    pub fn apply_update(&mut self, update: &LLMConfigUpdate) {
        if let Some(p) = &update.preferred_provider {
            self.preferred_provider = p.clone();
        }
        if let Some(k) = &update.openai_api_key {
            self.openai_api_key = Some(k.clone());
        }
        if let Some(k) = &update.anthropic_api_key {
            self.anthropic_api_key = Some(k.clone());
        }
        if let Some(k) = &update.groq_api_key {
            self.groq_api_key = Some(k.clone());
        }
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
        if let Some(m) = &update.anthropic_model {
            self.anthropic_model = m.clone();
        }
        if let Some(m) = &update.groq_model {
            self.groq_model = m.clone();
        }
    }

    /// Resolve which provider and model to use.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        let resolved = |provider: LLMProvider, model: &str, key: &Option<String>| {
            key.as_ref()
                .filter(|k| !k.trim().is_empty())
                .map(|k| ResolvedProvider {
                    provider,
                    model: model.to_string(),
                    api_key: k.clone(),
                })
        };

        match self.preferred_provider.as_str() {
            "openai" => resolved(LLMProvider::OpenAI, &self.openai_model, &self.openai_api_key),
            "anthropic" => resolved(
                LLMProvider::Anthropic,
                &self.anthropic_model,
                &self.anthropic_api_key,
            ),
            "groq" => resolved(LLMProvider::Groq, &self.groq_model, &self.groq_api_key),
            "auto" => resolved(
                LLMProvider::Anthropic,
                &self.anthropic_model,
                &self.anthropic_api_key,
            )
            .or_else(|| resolved(LLMProvider::Groq, &self.groq_model, &self.groq_api_key))
            .or_else(|| {
                resolved(LLMProvider::OpenAI, &self.openai_model, &self.openai_api_key)
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_prefers_anthropic() {
        let config = LLMConfig {
            openai_api_key: Some("sk-openai".into()),
            anthropic_api_key: Some("sk-ant".into()),
            ..Default::default()
        };
        let resolved = config.resolve_provider().unwrap();
        assert_eq!(resolved.provider, LLMProvider::Anthropic);
        assert_eq!(resolved.model, DEFAULT_ANTHROPIC_MODEL);
    }

    #[test]
    fn test_explicit_preference_without_key() {
        let config = LLMConfig {
            preferred_provider: "groq".into(),
            openai_api_key: Some("sk-openai".into()),
            ..Default::default()
        };
        assert!(config.resolve_provider().is_none());
    }

    #[test]
    fn test_blank_key_ignored() {
        let config = LLMConfig {
            anthropic_api_key: Some("   ".into()),
            groq_api_key: Some("gsk".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_provider().unwrap().provider, LLMProvider::Groq);
    }

    #[test]
    fn test_load_env_fallback_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llm-config.json");

        let mut config = LLMConfig::load_with(&path, |k| {
            (k == "OPENAI_API_KEY").then(|| "sk-env".to_string())
        });
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-env"));

        config.apply_update(&LLMConfigUpdate {
            preferred_provider: Some("openai".into()),
            openai_model: Some("gpt-4o".into()),
            ..Default::default()
        });
        config.save().unwrap();

        let reloaded = LLMConfig::load_with(&path, |_| None);
        assert_eq!(reloaded.preferred_provider, "openai");
        assert_eq!(reloaded.openai_model, "gpt-4o");
        assert_eq!(reloaded.openai_api_key.as_deref(), Some("sk-env"));
    }
}
