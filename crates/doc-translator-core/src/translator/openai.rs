use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::{Lang, TranslatorConfig};
use crate::error::{Error, Result};
use super::tokens::estimate_tokens;
use super::traits::Translator;

/// OpenAI-compatible API translator
/// Works with: llama.cpp server, Ollama, DeepSeek, OpenAI, etc.
pub struct OpenAiTranslator {
    client: Client,
    config: TranslatorConfig,
    lang_from: Lang,
    lang_to: Lang,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

impl OpenAiTranslator {
    /// Create a new OpenAI translator for a language pair.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created, which should only happen
    /// in extreme circumstances (e.g., TLS backend unavailable on the system).
    #[allow(clippy::expect_used)]
    pub fn new(config: TranslatorConfig, lang_from: Lang, lang_to: Lang) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            lang_from,
            lang_to,
        }
    }

    /// Create a translator configured from the process environment.
    pub fn from_env(lang_from: Lang, lang_to: Lang) -> Result<Self> {
        Ok(Self::new(TranslatorConfig::from_env()?, lang_from, lang_to))
    }

    /// Create the translation instruction for a block of text
    fn build_prompt(&self, text: &str) -> String {
        let from = language_name(&self.lang_from);
        let to = language_name(&self.lang_to);
        format!(
            "You are an expert in {from} and {to}.\n\
             Please provide a high-quality translation of the following text from {from} to {to}. \
             Only generate the translated text while keeping any existing line breaks. \
             No additional text or explanation needed.\nText: {text}"
        )
    }

    /// Prompt tokens may take at most half the context window; the rest is
    /// reserved for the response.
    const fn prompt_budget(&self) -> usize {
        self.config.max_context_tokens / 2
    }

    /// Make API request with retry logic
    async fn request_with_retry(&self, prompt: &str, prompt_tokens: usize) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );

        #[allow(clippy::cast_possible_truncation)]
        let max_tokens = (self.config.max_context_tokens - prompt_tokens).min(u32::MAX as usize) as u32;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            // Lower temperature for more consistent translations
            temperature: 0.3,
            max_tokens,
        };

        let mut last_error = None;

        for attempt in 0..self.config.retry_count {
            debug!(
                "translation request attempt {}/{} to {}",
                attempt + 1,
                self.config.retry_count,
                url
            );

            let req = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.config.api_key))
                .json(&request);

            match req.send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        match response.json::<ChatResponse>().await {
                            Ok(chat_response) => return extract_completion(chat_response),
                            Err(e) => {
                                warn!("failed to parse response: {e}");
                                last_error = Some(Error::TranslationRequest(e.to_string()));
                            }
                        }
                    } else if response.status().as_u16() == 429 {
                        // Rate limited
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse().ok());

                        warn!("rate limited, retry after {retry_after:?}s");
                        last_error = Some(Error::TranslationRequest("rate limited".to_string()));

                        // Wait longer on rate limit
                        let wait_time = retry_after.unwrap_or(5) * 1000;
                        tokio::time::sleep(Duration::from_millis(wait_time)).await;
                        continue;
                    } else {
                        let status = response.status();
                        let body = response.text().await.unwrap_or_default();
                        warn!("API error: {status} - {body}");
                        last_error =
                            Some(Error::TranslationRequest(format!("HTTP {status}: {body}")));
                    }
                }
                Err(e) => {
                    warn!("request failed: {e}");
                    if e.is_timeout() {
                        last_error = Some(Error::TranslationTimeout);
                    } else {
                        last_error = Some(Error::TranslationRequest(e.to_string()));
                    }
                }
            }

            // Wait before retry
            if attempt < self.config.retry_count - 1 {
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            }
        }

        error!(
            "translation failed after {} attempts",
            self.config.retry_count
        );
        Err(last_error
            .unwrap_or_else(|| Error::TranslationRequest("retries exhausted".to_string())))
    }
}

/// Accept only completions that finished normally; a length-limited or
/// otherwise truncated response would silently drop text.
fn extract_completion(response: ChatResponse) -> Result<String> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(Error::TranslationRequest(
            "no choices in response".to_string(),
        ));
    };

    match choice.finish_reason.as_deref() {
        Some("stop") | None => {}
        Some(other) => {
            return Err(Error::TranslationFinish {
                reason: other.to_string(),
            });
        }
    }

    if let Some(usage) = response.usage {
        debug!(
            "usage: {:?} prompt / {:?} completion tokens",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    Ok(choice.message.content)
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn translate(&self, text: &str) -> Result<String> {
        // Nothing to translate
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let prompt = self.build_prompt(text);
        let prompt_tokens = estimate_tokens(&prompt);
        if prompt_tokens > self.prompt_budget() {
            return Err(Error::RequestTooLarge {
                tokens: prompt_tokens,
                limit: self.prompt_budget(),
            });
        }

        self.request_with_retry(&prompt, prompt_tokens).await
    }

    fn request_tokens(&self, text: &str) -> usize {
        estimate_tokens(&self.build_prompt(text))
    }
}

/// Convert language code to a human-readable name for prompts
fn language_name(lang: &Lang) -> &str {
    match lang.as_str() {
        "en" => "English",
        "zh-CN" => "Simplified Chinese",
        "zh-TW" => "Traditional Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        // The backend should still understand most raw ISO codes
        other => other,
    }
}
