//! Translation backends and post-processing of backend output.

mod cache_only;
mod openai;
mod tokens;
mod traits;

pub use cache_only::CacheOnlyTranslator;
pub use openai::OpenAiTranslator;
pub use tokens::estimate_tokens;
pub use traits::Translator;

use std::path::Path;
use std::sync::Arc;

use crate::config::Lang;
use crate::error::{Error, Result};

/// Backend names accepted by [`create_translator`]
pub const TRANSLATOR_NAMES: &[&str] = &["openai", "cache-only"];

/// Create a translator by registry name.
///
/// The cache-only variant requires a durable cache path; constructing it
/// without one is a configuration error, checked here before any document
/// is touched.
pub fn create_translator(
    name: &str,
    lang_from: &Lang,
    lang_to: &Lang,
    cache_path: Option<&Path>,
) -> Result<Arc<dyn Translator>> {
    match name {
        "openai" => Ok(Arc::new(OpenAiTranslator::from_env(
            lang_from.clone(),
            lang_to.clone(),
        )?)),
        "cache-only" => {
            if cache_path.is_none() {
                return Err(Error::CacheOnlyWithoutStore);
            }
            Ok(Arc::new(CacheOnlyTranslator::new()))
        }
        other => Err(Error::UnsupportedTranslator {
            name: other.to_string(),
            available: TRANSLATOR_NAMES.join(", "),
        }),
    }
}

/// Reconcile trailing-newline presence between source and translation.
///
/// A gained trailing newline is stripped (possibly trimming more than was
/// gained); a lost one is restored.
pub fn prepare_translation(original: &str, translated: &str) -> String {
    if translated.ends_with('\n') && !original.ends_with('\n') {
        translated.trim_end().to_string()
    } else if !translated.ends_with('\n') && original.ends_with('\n') {
        format!("{translated}\n")
    } else {
        translated.to_string()
    }
}

/// Reject translations identical to the source modulo case and surrounding
/// whitespace; gibberish tends to round-trip unchanged and would clutter the
/// document with no-op overlays.
pub fn is_valid_translation(original: &str, translated: &str) -> bool {
    original.trim().to_lowercase() != translated.trim().to_lowercase()
}
