//! Document engine interface.
//!
//! The pipeline never parses page content streams or renders text itself;
//! those capabilities are consumed from a document engine through the
//! [`EngineDocument`] trait. The engine delivers structured text (blocks →
//! lines → spans, extracted under dehyphenate mode), embedded font byte
//! streams, optional-content layers, filled rectangles, and a text-box
//! placement primitive that signals overflow with a negative outcome.
//!
//! The crate ships one implementation, [`JsonDocument`]: an in-memory
//! structured document with JSON load/save, used by the CLI and the test
//! suite. Production bindings (e.g. over MuPDF) implement the same trait.

mod json;

pub use json::{JsonDocument, JsonFont, JsonPage, Layer, PlacedRect, PlacedText};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::TextColor;
use crate::error::Result;

/// Bounding box in page coordinates: (x0, y0) top-left, (x1, y1) bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Convert to array format [x0, y0, x1, y1]
    pub const fn as_array(self) -> [f32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

/// Identifier of an optional-content layer within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub usize);

/// Kind of a structured-text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Text,
    Image,
}

/// A single span of text sharing one font name and size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSpan {
    pub text: String,
    pub font: String,
    pub size: f32,
}

/// One line of spans, optionally carrying a 2D writing-direction vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    #[serde(default)]
    pub dir: Option<(f32, f32)>,
    pub spans: Vec<RawSpan>,
}

/// A structured-text block as delivered by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub kind: BlockKind,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub lines: Vec<RawLine>,
}

/// Structured text of one page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageText {
    pub blocks: Vec<RawBlock>,
}

/// A font referenced by a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontRef {
    /// Cross-reference id used to extract the font program
    pub xref: u32,
    /// Base font name
    pub name: String,
    /// Whether the font program is embedded in the document
    pub embedded: bool,
}

/// Raw bytes of an extracted font program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontData {
    pub bytes: Vec<u8>,
    /// File extension of the font format (e.g. "ttf", "otf")
    pub ext: String,
}

/// A text-box placement request
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub bbox: BoundingBox,
    pub text: String,
    pub font_size: f32,
    pub font_name: String,
    pub font_file: Option<PathBuf>,
    pub color: TextColor,
    /// Rotation angle in degrees
    pub rotation: Option<f32>,
    /// Target layer; `None` writes to the base page
    pub layer: Option<LayerId>,
}

/// Capabilities consumed from the document engine.
///
/// Pages are addressed 0-indexed; an out-of-range page is an
/// [`Error::InvalidPage`](crate::Error::InvalidPage).
pub trait EngineDocument: Send {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Structured text of a page, extracted under dehyphenate mode
    fn page_text(&self, page: usize) -> Result<PageText>;

    /// Fonts referenced by a page
    fn page_fonts(&self, page: usize) -> Result<Vec<FontRef>>;

    /// Extract an embedded font program by cross-reference id.
    ///
    /// Returns `None` when the font program cannot be recovered.
    fn extract_font(&self, xref: u32) -> Result<Option<FontData>>;

    /// Create (or look up) a named optional-content layer
    fn add_layer(&mut self, name: &str, visible: bool) -> Result<LayerId>;

    /// Draw a filled, borderless rectangle
    fn fill_rect(
        &mut self,
        page: usize,
        bbox: BoundingBox,
        color: TextColor,
        layer: Option<LayerId>,
    ) -> Result<()>;

    /// Place a text string into a rectangle.
    ///
    /// Returns the unused height within the box; a negative result signals
    /// overflow and nothing is placed.
    fn place_text(&mut self, page: usize, placement: &TextPlacement) -> Result<f32>;

    /// Save the finished document
    fn save(&self, path: &Path) -> Result<()>;
}
