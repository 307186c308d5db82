//! Source tree enumeration and entry classification.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// How a discovered file will be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Rendered to HTML
    Markdown,
    /// Copied byte for byte
    Asset,
    /// Skipped entirely
    Ignored,
}

/// One classified file discovered under the source root.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Directory exclusion rules, evaluated before descending into a subtree.
#[derive(Debug, Clone)]
pub struct ExcludeRules {
    /// Skip directories whose path contains any of these markers
    pub vendor_markers: Vec<String>,

    /// If set, skip directories whose path does not contain this marker
    pub include_marker: Option<String>,

    /// The destination root, never descended into
    pub dest_dir: PathBuf,
}

impl ExcludeRules {
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            vendor_markers: vec!["node_modules".to_string(), ".git".to_string()],
            include_marker: None,
            dest_dir: dest_dir.into(),
        }
    }

    /// Whether a directory's whole subtree should be skipped.
    pub fn skips(&self, dir: &Path) -> bool {
        if dir.starts_with(&self.dest_dir) {
            return true;
        }

        let text = dir.to_string_lossy();

        if self.vendor_markers.iter().any(|m| text.contains(m.as_str())) {
            return true;
        }

        if let Some(marker) = &self.include_marker {
            if !text.contains(marker.as_str()) {
                return true;
            }
        }

        false
    }
}

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

const ASSET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "css", "js", "pdf", "woff2",
];

/// Classify a file by extension alone.
pub fn classify(path: &Path) -> EntryKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if MARKDOWN_EXTENSIONS.contains(&ext.as_str()) {
        EntryKind::Markdown
    } else if ASSET_EXTENSIONS.contains(&ext.as_str()) {
        EntryKind::Asset
    } else {
        EntryKind::Ignored
    }
}

/// Enumerate every regular file under `root`, pruning excluded subtrees.
///
/// Traversal errors surface as `Err` items; the caller treats them as fatal.
pub fn walk(
    root: &Path,
    rules: &ExcludeRules,
) -> impl Iterator<Item = walkdir::Result<SourceEntry>> {
    let rules = rules.clone();

    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(move |entry| {
            // The root itself is never pruned.
            entry.depth() == 0 || !(entry.file_type().is_dir() && rules.skips(entry.path()))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() {
                    return None;
                }
                let path = entry.into_path();
                let kind = classify(&path);
                Some(Ok(SourceEntry { path, kind }))
            }
            Err(e) => Some(Err(e)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(classify(Path::new("a.md")), EntryKind::Markdown);
        assert_eq!(classify(Path::new("a.markdown")), EntryKind::Markdown);
        assert_eq!(classify(Path::new("a.PNG")), EntryKind::Asset);
        assert_eq!(classify(Path::new("style.css")), EntryKind::Asset);
        assert_eq!(classify(Path::new("a.tmp")), EntryKind::Ignored);
        assert_eq!(classify(Path::new("Makefile")), EntryKind::Ignored);
    }

    #[test]
    fn walks_nested_tree() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.md"), "# a").unwrap();
        fs::write(root.join("sub/b.md"), "# b").unwrap();
        fs::write(root.join("sub/c.png"), [0u8; 4]).unwrap();

        let rules = ExcludeRules::new(root.join("dist"));
        let entries: Vec<_> = walk(root, &rules).map(|e| e.unwrap()).collect();

        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries
                .iter()
                .filter(|e| e.kind == EntryKind::Markdown)
                .count(),
            2
        );
    }

    #[test]
    fn prunes_vendor_directories() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/readme.md"), "# vendored").unwrap();
        fs::write(root.join("a.md"), "# a").unwrap();

        let rules = ExcludeRules::new(root.join("dist"));
        let entries: Vec<_> = walk(root, &rules).map(|e| e.unwrap()).collect();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.ends_with("a.md"));
    }

    #[test]
    fn prunes_destination_inside_source() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let dest = root.join("dist");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.md"), "# stale").unwrap();
        fs::write(root.join("a.md"), "# a").unwrap();

        let rules = ExcludeRules::new(&dest);
        let entries: Vec<_> = walk(root, &rules).map(|e| e.unwrap()).collect();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].path.ends_with("a.md"));
    }

    #[test]
    fn include_marker_prunes_everything_else() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("content")).unwrap();
        fs::create_dir_all(root.join("scratch")).unwrap();
        fs::write(root.join("content/a.md"), "# a").unwrap();
        fs::write(root.join("scratch/b.md"), "# b").unwrap();

        let mut rules = ExcludeRules::new(root.join("dist"));
        rules.include_marker = Some("content".to_string());

        let entries: Vec<_> = walk(root, &rules).map(|e| e.unwrap()).collect();

        // Top-level files survive (the root is never pruned); scratch/ does not.
        assert!(entries.iter().all(|e| !e.path.starts_with(root.join("scratch"))));
        assert!(entries.iter().any(|e| e.path.ends_with("content/a.md")));
    }
}
