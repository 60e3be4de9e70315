use async_trait::async_trait;

use crate::error::{Error, Result};
use super::tokens::estimate_tokens;
use super::traits::Translator;

/// Serves previously cached results only; never reaches a live backend.
///
/// Every miss reports [`Error::TranslationUnavailable`] and the pipeline
/// keeps the original text. Without a durable cache this variant could not
/// produce any result at all, so the registry refuses to construct it
/// without one.
pub struct CacheOnlyTranslator;

impl CacheOnlyTranslator {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CacheOnlyTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for CacheOnlyTranslator {
    fn name(&self) -> &'static str {
        "cache-only"
    }

    async fn translate(&self, _text: &str) -> Result<String> {
        Err(Error::TranslationUnavailable)
    }

    fn request_tokens(&self, text: &str) -> usize {
        estimate_tokens(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_never_produces_a_translation() {
        let translator = CacheOnlyTranslator::new();
        assert!(matches!(
            translator.translate("Hello").await,
            Err(Error::TranslationUnavailable)
        ));
    }
}
