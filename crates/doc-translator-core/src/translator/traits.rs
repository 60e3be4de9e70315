use async_trait::async_trait;

use crate::error::Result;

/// Trait for translation backends.
///
/// `translate` reports failures as errors and never panics; the caller
/// decides whether to keep the original text in place. One failing block
/// must not abort a whole document.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Registry name of this backend
    fn name(&self) -> &'static str;

    /// Translate a block of text
    async fn translate(&self, text: &str) -> Result<String>;

    /// Estimated token count of the full request built for this text
    fn request_tokens(&self, text: &str) -> usize;
}
