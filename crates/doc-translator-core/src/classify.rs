//! Text classification: line-ending normalization and translatability.

/// Normalize line endings and decide whether the text is worth translating.
///
/// All `\r\n` and `\r` sequences become a single `\n`. The text is not
/// translatable when, with newlines and spaces removed, only digits remain;
/// page-number blocks would otherwise waste translation calls. The check
/// runs on the normalized text.
pub fn sanitize(text: &str) -> (String, bool) {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut digits_only = true;
    let mut seen = false;
    for c in normalized.chars() {
        if c == '\n' || c == ' ' {
            continue;
        }
        seen = true;
        if !c.is_numeric() {
            digits_only = false;
            break;
        }
    }

    let translatable = !(seen && digits_only);
    (normalized, translatable)
}
