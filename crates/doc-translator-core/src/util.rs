//! Utility functions shared across the crate.

use std::path::{Path, PathBuf};

use crate::config::Lang;

/// Derive the output path by inserting `-{target}` before the final file
/// extension of the input path.
pub fn output_path(input: &Path, target: &Lang) -> PathBuf {
    let name = input
        .file_name()
        .map_or_else(|| "output".to_string(), |n| n.to_string_lossy().into_owned());

    let renamed = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{target}.{ext}"),
        _ => format!("{name}-{target}"),
    };

    input.with_file_name(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_language_before_extension() {
        assert_eq!(
            output_path(Path::new("report.pdf"), &Lang::new("fr")),
            PathBuf::from("report-fr.pdf")
        );
        assert_eq!(
            output_path(Path::new("dir/report.json"), &Lang::new("zh-CN")),
            PathBuf::from("dir/report-zh-CN.json")
        );
    }

    #[test]
    fn test_only_final_extension_moves() {
        assert_eq!(
            output_path(Path::new("a.b/report.tar.gz"), &Lang::new("de")),
            PathBuf::from("a.b/report.tar-de.gz")
        );
    }

    #[test]
    fn test_extensionless_input_gets_suffix() {
        assert_eq!(
            output_path(Path::new("report"), &Lang::new("fr")),
            PathBuf::from("report-fr")
        );
    }

    #[test]
    fn test_hidden_file_keeps_name() {
        assert_eq!(
            output_path(Path::new(".config"), &Lang::new("fr")),
            PathBuf::from(".config-fr")
        );
    }
}
