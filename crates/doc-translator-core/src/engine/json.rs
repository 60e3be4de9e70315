//! In-memory structured document with JSON load/save.
//!
//! # Fit model
//!
//! `place_text` estimates whether a string fits its box instead of shaping
//! real glyphs: text is word-wrapped at `width / (size × char-width)` columns
//! and stacked at `size × line-height`. The returned value is the leftover
//! vertical space; a negative result means overflow and nothing is placed.
//! The factors match average metrics of common serif faces, which keeps the
//! estimate close to what a real renderer reports.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::TextColor;
use crate::error::{Error, Result};
use super::{
    BoundingBox, EngineDocument, FontData, FontRef, LayerId, PageText, TextPlacement,
};

/// Average character width as a fraction of font size.
const CHAR_WIDTH_FACTOR: f32 = 0.55;

/// Line height as a multiple of font size.
const LINE_HEIGHT_FACTOR: f32 = 1.25;

/// A named optional-content layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
}

/// A font entry carried by a page, optionally with its embedded program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFont {
    pub xref: u32,
    pub name: String,
    pub embedded: bool,
    #[serde(default)]
    pub data: Option<FontData>,
}

/// A filled rectangle placed on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedRect {
    pub bbox: BoundingBox,
    pub color: TextColor,
    pub layer: Option<LayerId>,
}

/// A text string placed on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedText {
    pub bbox: BoundingBox,
    pub text: String,
    pub font_size: f32,
    pub font_name: String,
    pub color: TextColor,
    pub rotation: Option<f32>,
    pub layer: Option<LayerId>,
}

/// One page: source structured text plus rendered content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonPage {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub text: PageText,
    #[serde(default)]
    pub fonts: Vec<JsonFont>,
    #[serde(default)]
    pub rects: Vec<PlacedRect>,
    #[serde(default)]
    pub overlays: Vec<PlacedText>,
}

impl JsonPage {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            text: PageText::default(),
            fonts: Vec::new(),
            rects: Vec::new(),
            overlays: Vec::new(),
        }
    }
}

/// A structured document held in memory, serializable to and from JSON
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonDocument {
    pub pages: Vec<JsonPage>,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl JsonDocument {
    /// Load a document from a JSON file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::DocumentOpen(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::DocumentOpen(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::DocumentOpen(e.to_string()))
    }

    fn page(&self, page: usize) -> Result<&JsonPage> {
        self.pages.get(page).ok_or(Error::InvalidPage {
            page,
            total: self.pages.len(),
        })
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut JsonPage> {
        let total = self.pages.len();
        self.pages
            .get_mut(page)
            .ok_or(Error::InvalidPage { page, total })
    }
}

impl EngineDocument for JsonDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: usize) -> Result<PageText> {
        Ok(self.page(page)?.text.clone())
    }

    fn page_fonts(&self, page: usize) -> Result<Vec<FontRef>> {
        Ok(self
            .page(page)?
            .fonts
            .iter()
            .map(|f| FontRef {
                xref: f.xref,
                name: f.name.clone(),
                embedded: f.embedded,
            })
            .collect())
    }

    fn extract_font(&self, xref: u32) -> Result<Option<FontData>> {
        for page in &self.pages {
            for font in &page.fonts {
                if font.xref == xref {
                    return Ok(font.data.clone());
                }
            }
        }
        Ok(None)
    }

    fn add_layer(&mut self, name: &str, visible: bool) -> Result<LayerId> {
        if let Some(index) = self.layers.iter().position(|l| l.name == name) {
            return Ok(LayerId(index));
        }
        self.layers.push(Layer {
            name: name.to_string(),
            visible,
        });
        Ok(LayerId(self.layers.len() - 1))
    }

    fn fill_rect(
        &mut self,
        page: usize,
        bbox: BoundingBox,
        color: TextColor,
        layer: Option<LayerId>,
    ) -> Result<()> {
        self.page_mut(page)?.rects.push(PlacedRect { bbox, color, layer });
        Ok(())
    }

    fn place_text(&mut self, page: usize, placement: &TextPlacement) -> Result<f32> {
        let target = self.page_mut(page)?;

        if placement.font_size <= 0.0 {
            return Ok(-1.0);
        }

        // Sideways text trades box width for height.
        let quarter_turn = placement
            .rotation
            .is_some_and(|deg| (deg.abs() - 90.0).abs() < f32::EPSILON || (deg - 270.0).abs() < f32::EPSILON);
        let (box_width, box_height) = if quarter_turn {
            (placement.bbox.height(), placement.bbox.width())
        } else {
            (placement.bbox.width(), placement.bbox.height())
        };

        let char_width = placement.font_size * CHAR_WIDTH_FACTOR;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_chars = (box_width / char_width).floor().max(0.0) as usize;
        if max_chars == 0 {
            return Ok(-1.0);
        }

        let mut lines = Vec::new();
        for segment in placement.text.split('\n') {
            lines.extend(word_wrap(segment, max_chars));
        }

        // A single word longer than the column limit overflows horizontally.
        if lines.iter().any(|l| l.chars().count() > max_chars) {
            return Ok(-1.0);
        }

        #[allow(clippy::cast_precision_loss)]
        let needed = lines.len() as f32 * placement.font_size * LINE_HEIGHT_FACTOR;
        let leftover = box_height - needed;
        if leftover < 0.0 {
            return Ok(leftover);
        }

        target.overlays.push(PlacedText {
            bbox: placement.bbox,
            text: placement.text.clone(),
            font_size: placement.font_size,
            font_name: placement.font_name.clone(),
            color: placement.color,
            rotation: placement.rotation,
            layer: placement.layer,
        });

        Ok(leftover)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| {
            Error::DocumentSave(format!("failed to create {}: {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|e| Error::DocumentSave(e.to_string()))
    }
}

/// Word wrap text to fit within max_chars per line.
fn word_wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + 1 + word.chars().count() <= max_chars {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn placement(bbox: BoundingBox, text: &str, size: f32) -> TextPlacement {
        TextPlacement {
            bbox,
            text: text.to_string(),
            font_size: size,
            font_name: "helv".to_string(),
            font_file: None,
            color: TextColor::black(),
            rotation: None,
            layer: None,
        }
    }

    fn one_page() -> JsonDocument {
        JsonDocument {
            pages: vec![JsonPage::new(612.0, 792.0)],
            layers: Vec::new(),
        }
    }

    #[test]
    fn test_word_wrap_respects_width() {
        let lines = word_wrap("the quick brown fox jumps", 11);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_word_wrap_empty_text() {
        assert_eq!(word_wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn test_place_text_fits() {
        let mut doc = one_page();
        let result = doc
            .place_text(0, &placement(BoundingBox::new(0.0, 0.0, 200.0, 100.0), "hello", 12.0))
            .unwrap();
        assert!(result >= 0.0);
        assert_eq!(doc.pages[0].overlays.len(), 1);
    }

    #[test]
    fn test_place_text_overflow_places_nothing() {
        let mut doc = one_page();
        let long = "a long sentence that cannot possibly fit into a tiny box at this size";
        let result = doc
            .place_text(0, &placement(BoundingBox::new(0.0, 0.0, 40.0, 10.0), long, 12.0))
            .unwrap();
        assert!(result < 0.0);
        assert!(doc.pages[0].overlays.is_empty());
    }

    #[test]
    fn test_place_text_zero_size_overflows() {
        let mut doc = one_page();
        let result = doc
            .place_text(0, &placement(BoundingBox::new(0.0, 0.0, 100.0, 100.0), "x", 0.0))
            .unwrap();
        assert!(result < 0.0);
    }

    #[test]
    fn test_place_text_invalid_page() {
        let mut doc = one_page();
        let result =
            doc.place_text(3, &placement(BoundingBox::new(0.0, 0.0, 10.0, 10.0), "x", 10.0));
        assert!(matches!(result, Err(Error::InvalidPage { page: 3, total: 1 })));
    }

    #[test]
    fn test_rotated_text_swaps_box_axes() {
        let mut doc = one_page();
        // Tall, narrow box: upright text overflows, sideways text fits.
        let bbox = BoundingBox::new(0.0, 0.0, 14.0, 200.0);
        let upright = doc.place_text(0, &placement(bbox, "rotated label", 10.0)).unwrap();
        assert!(upright < 0.0);

        let mut sideways = placement(bbox, "rotated label", 10.0);
        sideways.rotation = Some(90.0);
        let fit = doc.place_text(0, &sideways).unwrap();
        assert!(fit >= 0.0);
    }

    #[test]
    fn test_add_layer_reuses_existing_name() {
        let mut doc = one_page();
        let first = doc.add_layer("Text", true).unwrap();
        let second = doc.add_layer("Text", false).unwrap();
        assert_eq!(first, second);
        assert_eq!(doc.layers.len(), 1);
        assert!(doc.layers[0].visible);
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = one_page();
        doc.add_layer("Text", true).unwrap();
        doc.fill_rect(
            0,
            BoundingBox::new(1.0, 2.0, 3.0, 4.0),
            TextColor::white(),
            Some(LayerId(0)),
        )
        .unwrap();

        let json = serde_json::to_string(&doc).unwrap();
        let parsed = JsonDocument::from_json(&json).unwrap();
        assert_eq!(parsed, doc);
    }
}
