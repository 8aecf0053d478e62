use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AssistantError;

const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "study-assistant";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm_provider: LLMProvider,
    pub groq_api_key: String,
    pub groq_model: String,
    pub groq_base_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub request_timeout_secs: u64,
    pub preview_chars: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LLMProvider {
    Groq,
    OpenAI,
    Ollama,
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(LLMProvider::Groq),
            "openai" => Ok(LLMProvider::OpenAI),
            "ollama" => Ok(LLMProvider::Ollama),
            other => Err(format!(
                "unknown provider '{}' (expected groq, openai or ollama)",
                other
            )),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_provider: LLMProvider::Groq,
            groq_api_key: String::new(),
            groq_model: "llama3-8b-8192".to_string(),
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            openai_api_key: String::new(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            request_timeout_secs: 60,
            preview_chars: 3000,
        }
    }
}

impl AppConfig {
    /// Platform config directory for this application.
    pub fn default_dir() -> Result<PathBuf, AssistantError> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| AssistantError::Config("no config directory on this platform".to_string()))
    }

    pub fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Read the config file (creating it with defaults if missing), then
    /// apply environment overrides.
    pub fn load(config_dir: &Path) -> Self {
        let config_path = Self::file_path(config_dir);
        let mut config = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("Invalid config at {}: {}. Using defaults.", config_path.display(), e);
                    Self::default()
                }),
                Err(e) => {
                    log::warn!("Cannot read config at {}: {}. Using defaults.", config_path.display(), e);
                    Self::default()
                }
            }
        } else {
            let c = Self::default();
            if let Err(e) = c.save(config_dir) {
                log::warn!("Could not write default config: {}", e);
            }
            c
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), AssistantError> {
        std::fs::create_dir_all(config_dir)?;
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AssistantError::Config(e.to_string()))?;
        std::fs::write(Self::file_path(config_dir), content)?;
        Ok(())
    }

    /// Credentials and model from the environment win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GROQ_API_KEY") {
            self.groq_api_key = key;
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai_api_key = key;
        }
        if let Some(model) = non_empty("STUDY_ASSISTANT_MODEL") {
            self.set_model(model);
        }
    }

    /// Model id for the active provider.
    pub fn active_model(&self) -> &str {
        match self.llm_provider {
            LLMProvider::Groq => &self.groq_model,
            LLMProvider::OpenAI => &self.openai_model,
            LLMProvider::Ollama => &self.ollama_model,
        }
    }

    pub fn set_model(&mut self, model: String) {
        match self.llm_provider {
            LLMProvider::Groq => self.groq_model = model,
            LLMProvider::OpenAI => self.openai_model = model,
            LLMProvider::Ollama => self.ollama_model = model,
        }
    }

    /// Copy safe to print: API keys masked.
    pub fn redacted(&self) -> Self {
        let mask = |key: &str| {
            if key.is_empty() {
                String::new()
            } else {
                "********".to_string()
            }
        };
        Self {
            groq_api_key: mask(&self.groq_api_key),
            openai_api_key: mask(&self.openai_api_key),
            ..self.clone()
        }
    }
}
