//! Translation cache: source text → translated text.
//!
//! Keys are the raw source text, never normalized before lookup. Once a key
//! is present, re-querying returns the stored value without touching the
//! backend again for the lifetime of the store.

mod disk;
mod memory;

pub use disk::SledStore;
pub use memory::MemoryStore;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::translator::Translator;

/// Key-value store backing the translation cache
pub trait CacheStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    /// Flush pending writes to durable storage
    fn sync(&mut self) -> Result<()>;
    /// Release the store; an ephemeral store resets to empty instead
    fn close(&mut self) -> Result<()>;
}

/// Cache of translations with a translator to fill misses
pub struct TranslationCache {
    store: Box<dyn CacheStore>,
    translator: Arc<dyn Translator>,
}

impl TranslationCache {
    /// Create a cache, durable when a store path is given.
    pub fn new(path: Option<&Path>, translator: Arc<dyn Translator>) -> Result<Self> {
        let store: Box<dyn CacheStore> = match path {
            Some(path) => Box::new(SledStore::open(path)?),
            None => Box::new(MemoryStore::new()),
        };
        Ok(Self { store, translator })
    }

    /// Create a cache over an explicit store.
    pub fn with_store(store: Box<dyn CacheStore>, translator: Arc<dyn Translator>) -> Self {
        Self { store, translator }
    }

    /// Return the cached translation, or translate and store on a miss.
    ///
    /// A hit has no side effects. A miss that fails at the backend logs the
    /// failure and returns the original text without writing an entry, so a
    /// later retry reaches the backend again.
    pub async fn get_or_translate(&mut self, text: &str) -> Result<String> {
        if let Some(hit) = self.store.get(text) {
            debug!("cache hit ({} chars)", text.len());
            return Ok(hit);
        }

        match self.translator.translate(text).await {
            Ok(translated) => {
                self.store.set(text, &translated)?;
                Ok(translated)
            }
            Err(Error::TranslationUnavailable) => {
                debug!("no cached translation, keeping original text");
                Ok(text.to_string())
            }
            Err(e) => {
                warn!("translation failed, keeping original text: {e}");
                Ok(text.to_string())
            }
        }
    }

    /// Whether a source text already has a cached translation
    pub fn contains(&self, text: &str) -> bool {
        self.store.get(text).is_some()
    }

    /// Cached translation for a source text, if any
    pub fn get(&self, text: &str) -> Option<String> {
        self.store.get(text)
    }

    /// Flush pending writes; called at the end of each page so an
    /// interrupted run loses at most one page of translations.
    pub fn sync(&mut self) -> Result<()> {
        self.store.sync()
    }

    /// Release the durable store, or reset the ephemeral one to empty.
    pub fn close(&mut self) -> Result<()> {
        self.store.close()
    }
}
