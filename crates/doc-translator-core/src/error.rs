use thiserror::Error;

/// Unified error type for doc-translator-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Configuration (missing environment, invalid options)
/// - Translation backends (request failures, oversized requests)
/// - Block extraction (unsupported multi-rotation blocks)
/// - Cache operations (initialization, reading, writing)
/// - Document engine operations (structured text, layers, rendering, saving)
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// A required environment variable is not set
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// The cache-only translator was requested without a durable cache
    #[error("the cache-only translator requires a durable cache path")]
    CacheOnlyWithoutStore,

    /// Unknown translator name requested
    #[error("unsupported translator '{name}' (available: {available})")]
    UnsupportedTranslator { name: String, available: String },

    // ==========================================================================
    // Extraction Errors
    // ==========================================================================
    /// A text block spans more than one rotation direction
    #[error("text block spans multiple rotation directions: {0:?}")]
    MultiRotation(Vec<(i32, i32)>),

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation request would exceed the backend's context budget
    #[error("translation request of {tokens} tokens exceeds the per-request limit of {limit}")]
    RequestTooLarge { tokens: usize, limit: usize },

    /// Translation API request failed
    #[error("translation request failed: {0}")]
    TranslationRequest(String),

    /// Translation request timed out
    #[error("translation request timed out")]
    TranslationTimeout,

    /// Backend finished abnormally (length-limited, filtered, ...)
    #[error("translation finished abnormally: {reason}")]
    TranslationFinish { reason: String },

    /// No translation is available (cache-only mode miss)
    #[error("no cached translation available")]
    TranslationUnavailable,

    // ==========================================================================
    // Cache Errors
    // ==========================================================================
    /// Failed to initialize the cache store
    #[error("failed to initialize cache: {0}")]
    CacheInit(String),

    /// Failed to read from the cache store
    #[error("failed to read from cache: {0}")]
    CacheRead(String),

    /// Failed to write to the cache store
    #[error("failed to write to cache: {0}")]
    CacheWrite(String),

    // ==========================================================================
    // Document Engine Errors
    // ==========================================================================
    /// Failed to open or parse a document
    #[error("failed to open document: {0}")]
    DocumentOpen(String),

    /// Invalid page number requested
    #[error("invalid page number {page} (document has {total} pages)")]
    InvalidPage { page: usize, total: usize },

    /// Failed to retrieve structured text from a page
    #[error("failed to extract text from page {page}: {reason}")]
    TextExtraction { page: usize, reason: String },

    /// Failed to extract an embedded font
    #[error("failed to extract font '{name}': {reason}")]
    FontExtraction { name: String, reason: String },

    /// A document engine rendering operation failed
    #[error("engine render operation failed: {0}")]
    EngineRender(String),

    /// Failed to save the output document
    #[error("failed to save document: {0}")]
    DocumentSave(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
