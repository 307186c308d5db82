//! Title inference for markdown documents.

use std::path::Path;

/// Derive a page title from markdown source.
///
/// If the first non-empty line is a level-1 ATX heading, its trimmed text is
/// the title. Otherwise the file's base name without extension is used.
pub fn extract_title(source: &str, path: &Path) -> String {
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(text) = trimmed.strip_prefix("# ") {
            let text = text.trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
        break;
    }

    file_stem(path)
}

/// Base name of a path without its extension.
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_first_heading() {
        let title = extract_title("# Hello\nbody text", Path::new("a.md"));
        assert_eq!(title, "Hello");
    }

    #[test]
    fn skips_leading_blank_lines() {
        let title = extract_title("\n\n#  Spaced Out  \n\nbody", Path::new("a.md"));
        assert_eq!(title, "Spaced Out");
    }

    #[test]
    fn falls_back_to_file_stem() {
        let title = extract_title("just some text", Path::new("docs/notes.md"));
        assert_eq!(title, "notes");
    }

    #[test]
    fn deeper_heading_is_not_a_title() {
        let title = extract_title("## Subsection\nbody", Path::new("guide.md"));
        assert_eq!(title, "guide");
    }

    #[test]
    fn heading_must_come_first() {
        let title = extract_title("intro paragraph\n\n# Late Heading", Path::new("late.md"));
        assert_eq!(title, "late");
    }

    #[test]
    fn empty_heading_falls_back() {
        let title = extract_title("# \nbody", Path::new("blank.md"));
        assert_eq!(title, "blank");
    }
}
