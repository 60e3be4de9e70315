//! Text block extraction from structured page text.
//!
//! The engine delivers a tree of blocks → lines → spans; extraction flattens
//! each text block into a [`TextBlock`] with aggregated font metrics and a
//! single rotation. A block mixing more than one writing direction is not
//! supported and fails extraction.

use std::collections::HashMap;

use crate::engine::{BlockKind, BoundingBox, PageText};
use crate::error::{Error, Result};

/// A contiguous run of text on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// Area containing the text, in page coordinates
    pub bbox: BoundingBox,
    /// Concatenated span text, order-preserving, no separators inserted
    pub text: String,
    /// Arithmetic mean of the span font sizes; 0 if the block has no spans
    pub avg_font_size: f32,
    /// Most frequent span font name; ties go to the first-encountered name
    pub common_font: Option<String>,
    /// Rotation angle in degrees derived from the line direction vector
    pub rotation: Option<f32>,
}

/// Turn one page's structured text into an ordered list of text blocks.
///
/// Non-text blocks and blocks with empty or all-whitespace text are skipped.
/// A block whose lines carry more than one distinct (rounded) direction
/// vector fails with [`Error::MultiRotation`].
pub fn extract_blocks(page: &PageText) -> Result<Vec<TextBlock>> {
    let mut blocks = Vec::new();

    for raw in &page.blocks {
        if raw.kind != BlockKind::Text {
            continue;
        }

        let mut text = String::new();
        let mut sizes = Vec::new();
        let mut fonts = Vec::new();
        let mut directions: Vec<(i32, i32)> = Vec::new();

        for line in &raw.lines {
            if let Some((x, y)) = line.dir {
                // Snap near-axis directions to exact integers.
                #[allow(clippy::cast_possible_truncation)]
                let rounded = (x.round() as i32, y.round() as i32);
                if !directions.contains(&rounded) {
                    directions.push(rounded);
                }
            }

            for span in &line.spans {
                text.push_str(&span.text);
                sizes.push(span.size);
                fonts.push(span.font.as_str());
            }
        }

        if text.trim().is_empty() {
            continue;
        }

        if directions.len() > 1 {
            return Err(Error::MultiRotation(directions));
        }

        #[allow(clippy::cast_precision_loss)]
        let avg_font_size = if sizes.is_empty() {
            0.0
        } else {
            sizes.iter().sum::<f32>() / sizes.len() as f32
        };

        blocks.push(TextBlock {
            bbox: raw.bbox,
            text,
            avg_font_size,
            common_font: most_common(&fonts).map(str::to_string),
            rotation: directions.first().map(|&(x, y)| rotation_degrees(x, y)),
        });
    }

    Ok(blocks)
}

/// Most frequent entry; on a tie, the one encountered first among the most
/// frequent wins.
fn most_common<'a>(names: &[&'a str]) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &name in names {
        *counts.entry(name).or_insert(0) += 1;
    }

    let mut best: Option<(&'a str, usize)> = None;
    for &name in names {
        let count = counts[name];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name)
}

/// Angle of a direction vector in degrees, measured with y pointing up.
#[allow(clippy::cast_precision_loss)]
fn rotation_degrees(x: i32, y: i32) -> f32 {
    (-y as f32).atan2(x as f32).to_degrees()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::{RawBlock, RawLine, RawSpan};

    fn span(text: &str, font: &str, size: f32) -> RawSpan {
        RawSpan {
            text: text.to_string(),
            font: font.to_string(),
            size,
        }
    }

    fn block(lines: Vec<RawLine>) -> RawBlock {
        RawBlock {
            kind: BlockKind::Text,
            bbox: BoundingBox::new(0.0, 0.0, 100.0, 50.0),
            lines,
        }
    }

    fn page(blocks: Vec<RawBlock>) -> PageText {
        PageText { blocks }
    }

    #[test]
    fn test_concatenates_spans_without_separators() {
        let input = page(vec![block(vec![
            RawLine {
                dir: Some((1.0, 0.0)),
                spans: vec![span("Hello ", "Times", 11.0), span("world", "Times", 11.0)],
            },
            RawLine {
                dir: Some((1.0, 0.0)),
                spans: vec![span("again", "Times", 11.0)],
            },
        ])]);

        let blocks = extract_blocks(&input).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Hello worldagain");
    }

    #[test]
    fn test_average_font_size() {
        let input = page(vec![block(vec![RawLine {
            dir: None,
            spans: vec![span("a", "Times", 10.0), span("b", "Times", 14.0)],
        }])]);

        let blocks = extract_blocks(&input).unwrap();
        assert!((blocks[0].avg_font_size - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_common_font_tie_breaks_to_first_encountered() {
        let input = page(vec![block(vec![RawLine {
            dir: None,
            spans: vec![
                span("a", "Helvetica", 10.0),
                span("b", "Times", 10.0),
                span("c", "Times", 10.0),
                span("d", "Helvetica", 10.0),
            ],
        }])]);

        let blocks = extract_blocks(&input).unwrap();
        assert_eq!(blocks[0].common_font.as_deref(), Some("Helvetica"));
    }

    #[test]
    fn test_rotation_from_direction_vector() {
        let horizontal = page(vec![block(vec![RawLine {
            dir: Some((1.0, 0.0)),
            spans: vec![span("x", "Times", 10.0)],
        }])]);
        let blocks = extract_blocks(&horizontal).unwrap();
        assert!((blocks[0].rotation.unwrap() - 0.0).abs() < f32::EPSILON);

        // Downward direction vector means the text reads at +90 degrees.
        let vertical = page(vec![block(vec![RawLine {
            dir: Some((0.0, -1.0)),
            spans: vec![span("x", "Times", 10.0)],
        }])]);
        let blocks = extract_blocks(&vertical).unwrap();
        assert!((blocks[0].rotation.unwrap() - 90.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_no_direction_means_no_rotation() {
        let input = page(vec![block(vec![RawLine {
            dir: None,
            spans: vec![span("x", "Times", 10.0)],
        }])]);
        assert_eq!(extract_blocks(&input).unwrap()[0].rotation, None);
    }

    #[test]
    fn test_near_axis_directions_collapse_to_one() {
        let input = page(vec![block(vec![
            RawLine {
                dir: Some((1.0, 0.0)),
                spans: vec![span("a", "Times", 10.0)],
            },
            RawLine {
                dir: Some((0.999_99, 0.000_01)),
                spans: vec![span("b", "Times", 10.0)],
            },
        ])]);
        assert!(extract_blocks(&input).is_ok());
    }

    #[test]
    fn test_multiple_rotations_fail() {
        let input = page(vec![block(vec![
            RawLine {
                dir: Some((1.0, 0.0)),
                spans: vec![span("a", "Times", 10.0)],
            },
            RawLine {
                dir: Some((0.0, -1.0)),
                spans: vec![span("b", "Times", 10.0)],
            },
        ])]);
        assert!(matches!(extract_blocks(&input), Err(Error::MultiRotation(_))));
    }

    #[test]
    fn test_skips_image_and_empty_blocks() {
        let input = page(vec![
            RawBlock {
                kind: BlockKind::Image,
                bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                lines: Vec::new(),
            },
            block(vec![RawLine {
                dir: None,
                spans: vec![span("   ", "Times", 10.0)],
            }]),
            block(vec![RawLine {
                dir: None,
                spans: vec![span("kept", "Times", 10.0)],
            }]),
        ]);

        let blocks = extract_blocks(&input).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "kept");
    }

    #[test]
    fn test_empty_block_with_conflicting_directions_is_skipped() {
        // Rotation sanity only applies to blocks that carry text.
        let input = page(vec![block(vec![
            RawLine {
                dir: Some((1.0, 0.0)),
                spans: vec![span(" ", "Times", 10.0)],
            },
            RawLine {
                dir: Some((0.0, 1.0)),
                spans: vec![span(" ", "Times", 10.0)],
            },
        ])]);
        assert!(extract_blocks(&input).unwrap().is_empty());
    }
}
