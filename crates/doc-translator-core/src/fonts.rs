//! Embedded font catalog.
//!
//! Built once per document: every embedded font referenced by any page is
//! extracted to a file-backed asset keyed by font name, first-seen wins.
//! Fonts whose program has no usable glyph outlines are recorded as
//! present-but-unusable, which separates "unknown font" from "known but
//! unusable font" when resolving. Asset files live as long as the catalog.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use ttf_parser::{Face, GlyphId};
use tracing::{debug, info, warn};

use crate::engine::{EngineDocument, FontData};
use crate::error::{Error, Result};

/// Built-in baseline font identifier; requires no font file.
pub const BASE_FONT: &str = "helv";

/// Font resolved for a block: a name the engine understands and, for
/// file-backed assets, the path of the font program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    pub name: String,
    pub file: Option<PathBuf>,
}

/// Catalog of extracted font assets with fallback resolution
pub struct FontCatalog {
    /// `None` marks a font that is present but unusable
    assets: HashMap<String, Option<PathBuf>>,
    default_name: Option<String>,
    default_path: Option<PathBuf>,
    /// Keeps extracted asset files alive for the catalog's lifetime
    _extracted: Vec<TempPath>,
}

impl FontCatalog {
    /// Extract all embedded fonts of a document into file-backed assets.
    ///
    /// A caller-supplied default font is registered under its basename and
    /// becomes the designated fallback for unresolvable requests.
    pub fn build(doc: &dyn EngineDocument, default_font: Option<&Path>) -> Result<Self> {
        let mut assets: HashMap<String, Option<PathBuf>> = HashMap::new();
        let mut extracted = Vec::new();

        for page in 0..doc.page_count() {
            for font in doc.page_fonts(page)? {
                if !font.embedded || assets.contains_key(&font.name) {
                    continue;
                }

                let Some(data) = doc.extract_font(font.xref)? else {
                    warn!(
                        "could not extract embedded font '{}', it will be ignored",
                        font.name
                    );
                    assets.insert(font.name, None);
                    continue;
                };

                if !has_glyph_outlines(&data.bytes) {
                    warn!(
                        "embedded font '{}' is likely glyph-less or vector-only and will be ignored",
                        font.name
                    );
                    assets.insert(font.name, None);
                    continue;
                }

                let file = write_asset(&font.name, &data)?;
                info!("embedded font '{}' found", font.name);
                assets.insert(font.name, Some(file.to_path_buf()));
                extracted.push(file);
            }
        }

        let mut default_name = None;
        let mut default_path = None;
        if let Some(path) = default_font {
            if !path.is_file() {
                return Err(Error::InvalidConfig {
                    field: "default_font".to_string(),
                    reason: format!("{} is not a readable file", path.display()),
                });
            }
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| Error::InvalidConfig {
                    field: "default_font".to_string(),
                    reason: format!("{} has no file name", path.display()),
                })?;
            if !assets.contains_key(&name) {
                assets.insert(name.clone(), Some(path.to_path_buf()));
            }
            default_name = Some(name);
            default_path = Some(path.to_path_buf());
        }

        Ok(Self {
            assets,
            default_name,
            default_path,
            _extracted: extracted,
        })
    }

    /// Designated default font name, when one was registered
    pub fn default_font_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// Resolve a requested font name to a usable asset.
    ///
    /// Fallback order: the requested font's own asset, the designated
    /// default, the built-in baseline font.
    pub fn resolve(&self, requested: Option<&str>) -> ResolvedFont {
        if let Some(name) = requested {
            match self.assets.get(name) {
                Some(Some(path)) => {
                    return ResolvedFont {
                        name: name.to_string(),
                        file: Some(path.clone()),
                    };
                }
                // Known but unusable; already warned while building.
                Some(None) => {}
                None => debug!("font '{name}' not found in catalog"),
            }
        }

        if let (Some(name), Some(path)) = (&self.default_name, &self.default_path) {
            return ResolvedFont {
                name: name.clone(),
                file: Some(path.clone()),
            };
        }

        ResolvedFont {
            name: BASE_FONT.to_string(),
            file: None,
        }
    }
}

/// Write an extracted font program to a file-backed asset.
fn write_asset(name: &str, data: &FontData) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("doc-translator-font-")
        .suffix(&format!(".{}", data.ext))
        .tempfile()
        .map_err(|e| Error::FontExtraction {
            name: name.to_string(),
            reason: format!("failed to create asset file: {e}"),
        })?;
    file.write_all(&data.bytes).map_err(|e| Error::FontExtraction {
        name: name.to_string(),
        reason: format!("failed to write asset file: {e}"),
    })?;
    Ok(file.into_temp_path())
}

/// A face that parses but has no outline glyphs cannot render text.
fn has_glyph_outlines(bytes: &[u8]) -> bool {
    let Ok(face) = Face::parse(bytes, 0) else {
        return false;
    };

    struct NullBuilder;
    impl ttf_parser::OutlineBuilder for NullBuilder {
        fn move_to(&mut self, _x: f32, _y: f32) {}
        fn line_to(&mut self, _x: f32, _y: f32) {}
        fn quad_to(&mut self, _x1: f32, _y1: f32, _x: f32, _y: f32) {}
        fn curve_to(&mut self, _x1: f32, _y1: f32, _x2: f32, _y2: f32, _x: f32, _y: f32) {}
        fn close(&mut self) {}
    }

    let probe = face.number_of_glyphs().min(256);
    (0..probe).any(|gid| face.outline_glyph(GlyphId(gid), &mut NullBuilder).is_some())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::{JsonDocument, JsonFont, JsonPage};

    fn doc_with_fonts(fonts: Vec<JsonFont>) -> JsonDocument {
        let mut page = JsonPage::new(612.0, 792.0);
        page.fonts = fonts;
        JsonDocument {
            pages: vec![page],
            layers: Vec::new(),
        }
    }

    fn unusable_font(name: &str, xref: u32) -> JsonFont {
        JsonFont {
            xref,
            name: name.to_string(),
            embedded: true,
            // Not a parseable font program.
            data: Some(FontData {
                bytes: vec![0xde, 0xad, 0xbe, 0xef],
                ext: "ttf".to_string(),
            }),
        }
    }

    #[test]
    fn test_garbage_bytes_have_no_outlines() {
        assert!(!has_glyph_outlines(b"not a font"));
        assert!(!has_glyph_outlines(&[]));
    }

    #[test]
    fn test_unknown_font_falls_back_to_baseline() {
        let doc = doc_with_fonts(Vec::new());
        let catalog = FontCatalog::build(&doc, None).unwrap();

        let resolved = catalog.resolve(Some("NoSuchFont"));
        assert_eq!(resolved.name, BASE_FONT);
        assert_eq!(resolved.file, None);
    }

    #[test]
    fn test_unusable_font_falls_back_to_baseline() {
        let doc = doc_with_fonts(vec![unusable_font("Broken+Font", 7)]);
        let catalog = FontCatalog::build(&doc, None).unwrap();

        let resolved = catalog.resolve(Some("Broken+Font"));
        assert_eq!(resolved.name, BASE_FONT);
        assert_eq!(resolved.file, None);
    }

    #[test]
    fn test_unusable_font_prefers_designated_default() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("Fallback.ttf");
        std::fs::write(&default, b"placeholder").unwrap();

        let doc = doc_with_fonts(vec![unusable_font("Broken+Font", 7)]);
        let catalog = FontCatalog::build(&doc, Some(&default)).unwrap();

        assert_eq!(catalog.default_font_name(), Some("Fallback.ttf"));
        let resolved = catalog.resolve(Some("Broken+Font"));
        assert_eq!(resolved.name, "Fallback.ttf");
        assert_eq!(resolved.file, Some(default));
    }

    #[test]
    fn test_non_embedded_fonts_are_not_extracted() {
        let doc = doc_with_fonts(vec![JsonFont {
            xref: 1,
            name: "Times".to_string(),
            embedded: false,
            data: None,
        }]);
        let catalog = FontCatalog::build(&doc, None).unwrap();

        let resolved = catalog.resolve(Some("Times"));
        assert_eq!(resolved.name, BASE_FONT);
    }

    #[test]
    fn test_missing_default_font_file_is_config_error() {
        let doc = doc_with_fonts(Vec::new());
        let result = FontCatalog::build(&doc, Some(Path::new("/no/such/font.ttf")));
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_no_requested_font_uses_default_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("Fallback.ttf");
        std::fs::write(&default, b"placeholder").unwrap();

        let doc = doc_with_fonts(Vec::new());
        let catalog = FontCatalog::build(&doc, Some(&default)).unwrap();

        let resolved = catalog.resolve(None);
        assert_eq!(resolved.name, "Fallback.ttf");
    }
}
