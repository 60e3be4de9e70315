use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Language codes following ISO 639-1 with regional variants
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Text color for translated text, from a fixed palette
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl TextColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    pub const fn dark_red() -> Self {
        Self::new(0.8, 0.0, 0.0)
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn blue() -> Self {
        Self::new(0.0, 0.0, 0.8)
    }

    pub const fn dark_green() -> Self {
        Self::new(0.0, 0.5, 0.0)
    }

    pub const fn purple() -> Self {
        Self::new(0.5, 0.0, 0.5)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "darkred" | "dark_red" | "dark-red" => Some(Self::dark_red()),
            "black" => Some(Self::black()),
            "blue" => Some(Self::blue()),
            "darkgreen" | "dark_green" | "dark-green" => Some(Self::dark_green()),
            "purple" => Some(Self::purple()),
            _ => None,
        }
    }
}

impl Default for TextColor {
    fn default() -> Self {
        Self::dark_red()
    }
}

/// Environment variable holding the backend credential
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the model identifier
pub const ENV_MODEL: &str = "OPENAI_MODEL";
/// Environment variable holding the API base URL
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";
/// Environment variable overriding the context-window size in tokens
pub const ENV_MAX_CONTEXT_TOKENS: &str = "OPENAI_MAX_CONTEXT_TOKENS";

/// Context-window budget assumed when no override is set
pub const DEFAULT_MAX_CONTEXT_TOKENS: usize = 8192;

/// Translator backend configuration for OpenAI-compatible APIs.
///
/// Supports llama.cpp, Ollama, DeepSeek, OpenAI, and any other
/// OpenAI-compatible chat-completions API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    /// Combined request+response token budget of the backend
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl TranslatorConfig {
    /// Read the backend configuration from the process environment.
    ///
    /// Credential, model, and base URL are required; a missing variable is a
    /// fatal configuration error. The context-window override is optional.
    pub fn from_env() -> Result<Self> {
        let api_key = require_env(ENV_API_KEY)?;
        let model = require_env(ENV_MODEL)?;
        let api_base = require_env(ENV_API_BASE)?;

        let max_context_tokens = match std::env::var(ENV_MAX_CONTEXT_TOKENS) {
            Ok(raw) => raw.parse().map_err(|_| Error::InvalidConfig {
                field: ENV_MAX_CONTEXT_TOKENS.to_string(),
                reason: format!("'{raw}' is not a token count"),
            })?,
            Err(_) => DEFAULT_MAX_CONTEXT_TOKENS,
        };

        Ok(Self {
            api_base,
            api_key,
            model,
            max_context_tokens,
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
        })
    }
}

fn require_env(name: &'static str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(Error::MissingEnv(name))
}

const fn default_max_context_tokens() -> usize {
    DEFAULT_MAX_CONTEXT_TOKENS
}

const fn default_retry_count() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

/// Options for a single document translation run
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Source language
    pub source_lang: Lang,

    /// Target language
    pub target_lang: Lang,

    /// Name of the optional-content layer holding translated text
    pub layer_name: String,

    /// Translated text color
    pub text_color: TextColor,

    /// Keep the original text visible on the base layer
    pub keep_original: bool,

    /// Fallback font file registered in the catalog under its basename
    pub default_font: Option<PathBuf>,

    /// Durable translation cache location (in-memory only when unset)
    pub cache_path: Option<PathBuf>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            source_lang: Lang::new("en"),
            target_lang: Lang::new("zh-CN"),
            layer_name: "Text".to_string(),
            text_color: TextColor::default(),
            keep_original: true,
            default_font: None,
            cache_path: None,
        }
    }
}
