//! Markdown rendering for lamina.
//!
//! Turns markdown source into a complete HTML document with an inferred
//! title, then post-processes it to syntax-highlight fenced code blocks.

pub mod highlight;
pub mod markdown;
pub mod title;

pub use highlight::Highlighter;
pub use markdown::{normalize_newlines, render_document, PageOptions, RenderedPage};
pub use title::extract_title;

/// Errors that can occur while rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to rewrite rendered HTML: {0}")]
    Rewrite(String),
}
