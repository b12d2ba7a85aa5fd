use anyhow::Context;
use secrecy::SecretString;
use std::env;

use crate::models::ModelSelection;
use crate::utils::{system_prompt_for, DEFAULT_SYSTEM_PROMPT};

#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub openrouter: OpenRouterSettings,
    pub chat: ChatSettings,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_json_payload_size: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

/// Connection settings for the OpenRouter chat-completions API.
#[derive(Debug)]
pub struct OpenRouterSettings {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub referer: String,
    pub title: String,
    pub timeout_secs: u64,
}

/// Everything that shapes the upstream conversation.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub models: ModelSelection,
    pub max_message_chars: usize,
    pub history_window: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            models: ModelSelection::default(),
            max_message_chars: 500,
            history_window: 6,
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

impl Default for OpenRouterSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            referer: "https://localhost".to_string(),
            title: "Tiered Chat Proxy".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5732,
                workers: num_cpus::get(),
                max_json_payload_size: 1024 * 1024,
            },
            security: SecurityConfig {
                allowed_origins: vec!["*".to_string()],
            },
            openrouter: OpenRouterSettings::default(),
            chat: ChatSettings::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        // Server configuration
        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.server.port = port.parse().context("invalid PORT")?;
        }
        if let Some(workers) = lookup("WORKERS") {
            config.server.workers = workers.parse().context("invalid WORKERS")?;
        }
        if let Some(size) = lookup("MAX_JSON_PAYLOAD_SIZE") {
            config.server.max_json_payload_size =
                size.parse().context("invalid MAX_JSON_PAYLOAD_SIZE")?;
        }

        // Security configuration
        if let Some(allowed_origins) = lookup("ALLOWED_ORIGINS") {
            config.security.allowed_origins = allowed_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // OpenRouter configuration
        config.openrouter.api_key = lookup("OPENROUTER_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);
        if let Some(base_url) = lookup("OPENROUTER_BASE_URL") {
            config.openrouter.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(referer) = lookup("OPENROUTER_REFERER") {
            config.openrouter.referer = referer;
        }
        if let Some(title) = lookup("OPENROUTER_TITLE") {
            config.openrouter.title = title;
        }
        if let Some(timeout) = lookup("OPENROUTER_TIMEOUT_SECS") {
            config.openrouter.timeout_secs =
                timeout.parse().context("invalid OPENROUTER_TIMEOUT_SECS")?;
        }

        // Chat configuration
        if let Some(model) = lookup("MODEL_SIMPLE") {
            config.chat.models.simple = model;
        }
        if let Some(model) = lookup("MODEL_MEDIUM") {
            config.chat.models.medium = model;
        }
        if let Some(model) = lookup("MODEL_COMPLEX") {
            config.chat.models.complex = model;
        }
        config.chat.system_prompt =
            system_prompt_for(lookup("SYSTEM_PROMPT").as_deref()).to_string();
        if let Some(max_tokens) = lookup("MAX_TOKENS") {
            config.chat.max_tokens = max_tokens.parse().context("invalid MAX_TOKENS")?;
        }
        if let Some(temperature) = lookup("TEMPERATURE") {
            config.chat.temperature = temperature.parse().context("invalid TEMPERATURE")?;
        }

        Ok(config)
    }
}
