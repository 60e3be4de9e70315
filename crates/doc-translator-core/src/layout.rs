//! Fit-to-box text placement.

use tracing::warn;

use crate::engine::{EngineDocument, TextPlacement};
use crate::error::Result;

/// Render text into its box, shrinking the font size until it fits.
///
/// The engine reports overflow with a negative outcome; on overflow the size
/// drops by one unit and placement is retried. When the size reaches zero
/// without a fit, placement is abandoned with a diagnostic and `Ok(false)`;
/// the page continues. For a starting size `n` this makes at most `n + 1`
/// attempts and never renders at a negative size.
pub fn place_text_block(
    doc: &mut dyn EngineDocument,
    page: usize,
    placement: &TextPlacement,
) -> Result<bool> {
    let mut attempt = placement.clone();
    attempt.font_size = attempt.font_size.max(0.0);

    loop {
        if doc.place_text(page, &attempt)? >= 0.0 {
            return Ok(true);
        }
        if attempt.font_size < 1.0 {
            break;
        }
        attempt.font_size -= 1.0;
    }

    warn!(
        "could not render text on page {page} at {:?}",
        placement.bbox.as_array()
    );
    Ok(false)
}
