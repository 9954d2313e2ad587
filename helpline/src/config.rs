//! Runtime configuration for the helpline platform.
//!
//! Everything is read from the process environment with the same variable
//! names the deployment uses; nothing here touches the filesystem. Media
//! platform credentials and provider keys may be empty, in which case the
//! gateway still serves the data routes and the router falls back to keyword
//! classification.

use serde::{Deserialize, Serialize};

use crate::error::{HelplineError, HelplineResult};

/// Application settings, one instance per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Application
    pub app_name: String,
    pub app_version: String,
    pub debug: bool,

    // Media platform (LiveKit-compatible)
    pub livekit_url: String,
    pub livekit_api_key: String,
    pub livekit_api_secret: String,

    // AI provider API keys
    pub groq_api_key: String,
    pub openai_api_key: String,

    // Agent model configuration
    pub stt_model: String,
    pub llm_model: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub tts_speed: f64,
    pub llm_temperature: f64,

    // Memory configuration
    pub memory_file_path: String,
    pub user_memory_file_path: String,

    // Knowledge base
    pub data_dir: String,

    // Server
    pub host: String,
    pub port: u16,

    // CORS
    pub allowed_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Parul University Admission AI".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            debug: true,
            livekit_url: String::new(),
            livekit_api_key: String::new(),
            livekit_api_secret: String::new(),
            groq_api_key: String::new(),
            openai_api_key: String::new(),
            stt_model: "whisper-large-v3-turbo".to_string(),
            llm_model: "llama-3.1-8b-instant".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.1,
            llm_temperature: 0.7,
            memory_file_path: "./memory/conversations.json".to_string(),
            user_memory_file_path: "./memory/users.json".to_string(),
            data_dir: "./data".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl Settings {
    /// Build settings from the process environment, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> HelplineResult<Self> {
        let defaults = Settings::default();

        let settings = Settings {
            app_name: env_or("APP_NAME", defaults.app_name),
            app_version: defaults.app_version,
            debug: env_bool("DEBUG", defaults.debug),
            livekit_url: env_or("LIVEKIT_URL", defaults.livekit_url),
            livekit_api_key: env_or("LIVEKIT_API_KEY", defaults.livekit_api_key),
            livekit_api_secret: env_or("LIVEKIT_API_SECRET", defaults.livekit_api_secret),
            groq_api_key: env_or("GROQ_API_KEY", defaults.groq_api_key),
            openai_api_key: env_or("OPENAI_API_KEY", defaults.openai_api_key),
            stt_model: env_or("STT_MODEL", defaults.stt_model),
            llm_model: env_or("LLM_MODEL", defaults.llm_model),
            tts_model: env_or("TTS_MODEL", defaults.tts_model),
            tts_voice: env_or("TTS_VOICE", defaults.tts_voice),
            tts_speed: env_parsed("TTS_SPEED", defaults.tts_speed)?,
            llm_temperature: env_parsed("LLM_TEMPERATURE", defaults.llm_temperature)?,
            memory_file_path: env_or("MEMORY_FILE_PATH", defaults.memory_file_path),
            user_memory_file_path: env_or("USER_MEMORY_FILE_PATH", defaults.user_memory_file_path),
            data_dir: env_or("DATA_DIR", defaults.data_dir),
            host: env_or("HOST", defaults.host),
            port: env_parsed("PORT", defaults.port)?,
            allowed_origins: match std::env::var("ALLOWED_ORIGINS") {
                Ok(raw) => parse_origins(&raw),
                Err(_) => defaults.allowed_origins,
            },
        };

        Ok(settings)
    }

    /// Whether an LLM provider is configured for intent classification.
    pub fn has_llm_provider(&self) -> bool {
        !self.groq_api_key.is_empty() || !self.openai_api_key.is_empty()
    }

    /// Socket address string for the gateway listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a comma-separated origin list into a Vec, trimming whitespace.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => {
            let v = v.to_lowercase();
            v == "1" || v == "true" || v == "on" || v == "yes"
        }
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> HelplineResult<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| HelplineError::Config(format!("invalid value for {}: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_comma_separated() {
        let origins = parse_origins("http://a.example, http://b.example ,http://c.example");
        assert_eq!(
            origins,
            vec!["http://a.example", "http://b.example", "http://c.example"]
        );
    }

    #[test]
    fn test_parse_origins_skips_empty_segments() {
        let origins = parse_origins("http://a.example,, ,http://b.example");
        assert_eq!(origins.len(), 2);
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.llm_model, "llama-3.1-8b-instant");
        assert!(!settings.has_llm_provider());
    }
}
