//! Markdown to full-page HTML rendering.

use std::path::Path;

use pulldown_cmark::{html, Options, Parser};

use crate::title::extract_title;

/// References injected into the head of every rendered page.
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// href of the stylesheet link
    pub stylesheet: String,

    /// href of the favicon link
    pub favicon: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            stylesheet: "/style.css".to_string(),
            favicon: "/favicon.ico".to_string(),
        }
    }
}

/// A rendered markdown document.
#[derive(Debug)]
pub struct RenderedPage {
    /// Inferred page title
    pub title: String,

    /// Complete HTML document
    pub html: String,
}

/// Normalize line endings to `\n`.
pub fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n").replace('\r', "\n")
}

/// Render markdown source into a complete HTML document.
///
/// The source is normalized first; the title comes from the first level-1
/// heading, falling back to the file stem of `path`.
pub fn render_document(source: &str, path: &Path, options: &PageOptions) -> RenderedPage {
    let normalized = normalize_newlines(source);
    let title = extract_title(&normalized, path);

    let parse_options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(&normalized, parse_options);

    let mut body = String::new();
    html::push_html(&mut body, parser);

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="{stylesheet}">
<link rel="icon" href="{favicon}">
</head>
<body>
{body}</body>
</html>
"#,
        title = escape_html(&title),
        stylesheet = options.stylesheet,
        favicon = options.favicon,
    );

    RenderedPage { title, html }
}

/// Escape text for embedding in HTML element content.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
