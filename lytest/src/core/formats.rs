//! Layout file extension allow-lists.

use std::path::Path;

use thiserror::Error;

/// Extensions accepted by `lytest diff` (layouts plus KiCad PCB).
pub const DIFF_EXTENSIONS: &[&str] = &["gds", "oas", "kicad_pcb"];

/// Extensions accepted by `lytest git-diff`. PCB diffing is not wired into git.
pub const GIT_EXTENSIONS: &[&str] = &["gds", "oas"];

/// Attribute patterns installed by `lytest git-config`, one line each.
pub const ATTRIBUTE_EXTENSIONS: &[&str] = &["gds", "GDS", "oas", "OAS", "kicad_pcb"];

/// A file whose extension is outside the allow-list of the current command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized layout format: {file}")]
pub struct UnrecognizedFormat {
    pub file: String,
}

/// Check `path` against `allowed` (case-insensitive, without the leading dot).
pub fn check_extension(path: &Path, allowed: &[&str]) -> Result<(), UnrecognizedFormat> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(UnrecognizedFormat {
            file: path.display().to_string(),
        }),
    }
}

/// True if `ext` (no dot, any case) is accepted by `lytest diff`.
pub fn is_diff_extension(ext: &str) -> bool {
    DIFF_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_upper_case_gds() {
        assert!(check_extension(Path::new("a.GDS"), DIFF_EXTENSIONS).is_ok());
        assert!(check_extension(Path::new("dir/b.Oas"), GIT_EXTENSIONS).is_ok());
    }

    #[test]
    fn rejects_txt_and_names_file() {
        let err = check_extension(Path::new("notes.txt"), DIFF_EXTENSIONS).unwrap_err();
        assert_eq!(err.file, "notes.txt");
        assert_eq!(err.to_string(), "Unrecognized layout format: notes.txt");
    }

    #[test]
    fn kicad_only_allowed_for_diff() {
        let board = Path::new("board.kicad_pcb");
        assert!(check_extension(board, DIFF_EXTENSIONS).is_ok());
        assert!(check_extension(board, GIT_EXTENSIONS).is_err());
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(check_extension(Path::new("layout"), DIFF_EXTENSIONS).is_err());
    }
}
