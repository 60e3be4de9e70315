//! Doc Translator Core Library
//!
//! This library provides the core functionality for translating paginated
//! documents while preserving their visual layout:
//! - Text block extraction from structured page text
//! - Translation via OpenAI-compatible APIs, behind a persistent cache
//! - Embedded font extraction with fallback resolution
//! - Fit-to-box re-layout of translated text into an overlay layer

pub mod budget;
pub mod cache;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod fonts;
pub mod layout;
pub mod translator;
pub mod util;

pub use budget::{BudgetAnalyzer, BudgetReport};
pub use cache::{CacheStore, MemoryStore, SledStore, TranslationCache};
pub use config::{Lang, TextColor, TranslateOptions, TranslatorConfig};
pub use engine::{
    BoundingBox, EngineDocument, JsonDocument, LayerId, PageText, TextPlacement,
};
pub use error::{Error, Result};
pub use extract::{TextBlock, extract_blocks};
pub use fonts::{BASE_FONT, FontCatalog, ResolvedFont};
pub use translator::{
    CacheOnlyTranslator, OpenAiTranslator, Translator, create_translator,
};
pub use util::output_path;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

/// Layer receiving relocated original text when the base page is cleared
const ORIGINAL_LAYER_NAME: &str = "Original";

/// Per-page progress callback: (pages done, total pages)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send>;

/// High-level document translator driving the per-page, per-block pipeline
pub struct DocumentTranslator {
    translator: Arc<dyn Translator>,
    options: TranslateOptions,
}

impl DocumentTranslator {
    /// Create a pipeline with the backend selected by name from the registry
    pub fn new(translator_name: &str, options: TranslateOptions) -> Result<Self> {
        let translator = translator::create_translator(
            translator_name,
            &options.source_lang,
            &options.target_lang,
            options.cache_path.as_deref(),
        )?;

        Ok(Self {
            translator,
            options,
        })
    }

    /// Create with a custom translator
    pub fn with_translator(translator: Arc<dyn Translator>, options: TranslateOptions) -> Self {
        Self {
            translator,
            options,
        }
    }

    pub const fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translate every page of `doc` and save the result next to `input`,
    /// with `-{target_lang}` inserted before the file extension.
    ///
    /// The translation cache is closed before any error propagates; a failed
    /// run produces no output file.
    pub async fn translate_document(
        &self,
        doc: &mut dyn EngineDocument,
        input: &Path,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<PathBuf> {
        let mut cache = TranslationCache::new(
            self.options.cache_path.as_deref(),
            Arc::clone(&self.translator),
        )?;

        let result = self
            .run(doc, &mut cache, input, progress_callback.as_ref())
            .await;
        let closed = cache.close();

        let output = result?;
        closed?;
        Ok(output)
    }

    async fn run(
        &self,
        doc: &mut dyn EngineDocument,
        cache: &mut TranslationCache,
        input: &Path,
        progress_callback: Option<&ProgressCallback>,
    ) -> Result<PathBuf> {
        let catalog = FontCatalog::build(&*doc, self.options.default_font.as_deref())?;

        let translated_layer = doc.add_layer(&self.options.layer_name, true)?;
        let original_layer = if self.options.keep_original {
            None
        } else {
            Some(doc.add_layer(ORIGINAL_LAYER_NAME, false)?)
        };

        let total_pages = doc.page_count();
        for page in 0..total_pages {
            info!("translating page {}/{}", page + 1, total_pages);
            self.translate_page(doc, cache, &catalog, page, translated_layer, original_layer)
                .await?;

            // Page checkpoint: an interrupted run loses at most one page.
            cache.sync()?;

            if let Some(callback) = progress_callback {
                callback(page + 1, total_pages);
            }
        }

        let output = util::output_path(input, &self.options.target_lang);
        doc.save(&output)?;
        Ok(output)
    }

    async fn translate_page(
        &self,
        doc: &mut dyn EngineDocument,
        cache: &mut TranslationCache,
        catalog: &FontCatalog,
        page: usize,
        translated_layer: LayerId,
        original_layer: Option<LayerId>,
    ) -> Result<()> {
        let page_text = doc.page_text(page)?;
        let blocks = extract::extract_blocks(&page_text)?;
        debug!("page {}: {} text blocks", page, blocks.len());

        for block in blocks {
            let (text, translatable) = classify::sanitize(&block.text);
            if !translatable {
                continue;
            }

            let raw = cache.get_or_translate(&text).await?;
            let translated = translator::prepare_translation(&text, &raw);
            if !translator::is_valid_translation(&text, &translated) {
                continue;
            }

            if let Some(original_layer) = original_layer {
                // Relocate the original text to the hidden layer, then clear
                // its box on the base page for good.
                let fallback = catalog.resolve(None);
                layout::place_text_block(
                    doc,
                    page,
                    &TextPlacement {
                        bbox: block.bbox,
                        text: text.clone(),
                        font_size: block.avg_font_size,
                        font_name: fallback.name,
                        font_file: fallback.file,
                        color: TextColor::black(),
                        rotation: block.rotation,
                        layer: Some(original_layer),
                    },
                )?;
                doc.fill_rect(page, block.bbox, TextColor::white(), None)?;
            } else {
                // Cover the original only on the translated layer; hiding
                // that layer reveals the untouched base page.
                doc.fill_rect(page, block.bbox, TextColor::white(), Some(translated_layer))?;
            }

            let resolved = catalog.resolve(block.common_font.as_deref());
            let placement = TextPlacement {
                bbox: block.bbox,
                text: translated,
                font_size: block.avg_font_size,
                font_name: resolved.name,
                font_file: resolved.file,
                color: self.options.text_color,
                rotation: block.rotation,
                layer: Some(translated_layer),
            };
            layout::place_text_block(doc, page, &placement)?;
        }

        Ok(())
    }
}
