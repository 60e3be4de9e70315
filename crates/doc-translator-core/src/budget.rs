//! Dry-run cost analysis.
//!
//! Runs extraction and classification over a whole document and reports what
//! a translation run would cost, without calling the backend and without
//! mutating the document or the cache.

use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::TranslationCache;
use crate::classify;
use crate::engine::EngineDocument;
use crate::error::Result;
use crate::extract;
use crate::translator::Translator;

/// Aggregate request cost of translating a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetReport {
    /// Backend requests a run would need (distinct uncached blocks)
    pub requests: usize,
    /// Sum of request token counts
    pub total_request_tokens: usize,
    /// Largest single request
    pub max_request_tokens: usize,
    /// Requests exceeding the analyzer's threshold
    pub over_threshold: usize,
    /// Blocks already satisfied by the cache
    pub cached_blocks: usize,
}

/// Read-only analyzer reusing the pipeline's extraction, classification, and
/// token counting
pub struct BudgetAnalyzer {
    translator: Arc<dyn Translator>,
    /// Per-request token target for the over-budget count
    threshold: usize,
}

impl BudgetAnalyzer {
    pub const fn new(translator: Arc<dyn Translator>, threshold: usize) -> Self {
        Self {
            translator,
            threshold,
        }
    }

    /// Estimate the cost of translating `doc`.
    ///
    /// Repeated blocks count once, mirroring the cache behavior of a real
    /// run; blocks already present in `cache` need no request at all.
    pub fn analyze(
        &self,
        doc: &dyn EngineDocument,
        cache: &TranslationCache,
    ) -> Result<BudgetReport> {
        let mut report = BudgetReport::default();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 0..doc.page_count() {
            let page_text = doc.page_text(page)?;
            for block in extract::extract_blocks(&page_text)? {
                let (text, translatable) = classify::sanitize(&block.text);
                if !translatable {
                    continue;
                }

                if cache.contains(&text) {
                    report.cached_blocks += 1;
                    continue;
                }

                if !seen.insert(text.clone()) {
                    continue;
                }

                let tokens = self.translator.request_tokens(&text);
                report.requests += 1;
                report.total_request_tokens += tokens;
                report.max_request_tokens = report.max_request_tokens.max(tokens);
                if tokens > self.threshold {
                    report.over_threshold += 1;
                }
            }
        }

        Ok(report)
    }
}
