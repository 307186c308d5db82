//! Syntax highlighting of fenced code blocks in rendered HTML.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::RenderError;

/// Rewrites rendered HTML, replacing the text of every `language-` annotated
/// code element with syntect markup.
///
/// Construct once and share; loading the syntax set is expensive.
pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Highlight every annotated code block in an HTML document.
    ///
    /// Code elements without a `language-` class are left untouched. Unknown
    /// or malformed language tags fall back to the plain-text syntax, so a
    /// bad annotation never fails the document. The rewriter streams the
    /// input, so surrounding structure passes through byte for byte.
    pub fn rewrite(&self, html: &str) -> Result<String, RenderError> {
        let language: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
        let buffer: Rc<RefCell<String>> = Rc::new(RefCell::new(String::new()));

        let element_language = Rc::clone(&language);
        let chunk_language = Rc::clone(&language);
        let chunk_buffer = Rc::clone(&buffer);

        rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![
                    element!(r#"code[class*="language-"]"#, move |el| {
                        *element_language.borrow_mut() = el
                            .get_attribute("class")
                            .as_deref()
                            .and_then(language_from_class);
                        Ok(())
                    }),
                    text!(r#"code[class*="language-"]"#, move |chunk| {
                        chunk_buffer.borrow_mut().push_str(chunk.as_str());

                        if !chunk.last_in_text_node() {
                            chunk.remove();
                            return Ok(());
                        }

                        let raw = std::mem::take(&mut *chunk_buffer.borrow_mut());
                        let lang = chunk_language.borrow_mut().take();
                        let code = decode_entities(&raw);

                        match self.highlight(lang.as_deref(), &code) {
                            Ok(markup) => chunk.replace(&markup, ContentType::Html),
                            // Highlighting failures keep the block as written.
                            Err(_) => chunk.replace(&raw, ContentType::Html),
                        }
                        Ok(())
                    }),
                ],
                ..RewriteStrSettings::default()
            },
        )
        .map_err(|e| RenderError::Rewrite(e.to_string()))
    }

    fn highlight(&self, language: Option<&str>, code: &str) -> Result<String, syntect::Error> {
        let syntax = language
            .and_then(|token| self.syntaxes.find_syntax_by_token(token))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut code = code.to_string();
        if !code.ends_with('\n') {
            code.push('\n');
        }

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);

        for line in LinesWithEndings::from(&code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(generator.finalize())
    }
}

/// Pull the language token out of a `language-…` class list.
fn language_from_class(class: &str) -> Option<String> {
    class
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-"))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

/// Undo the entity escaping the markdown renderer applied to code text.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_known_language() {
        let highlighter = Highlighter::new();
        let html = r#"<pre><code class="language-rust">fn main() {}</code></pre>"#;

        let out = highlighter.rewrite(html).unwrap();

        assert!(out.contains("<span"), "expected syntect markup: {out}");
        assert!(out.contains("main"));
        assert!(out.starts_with("<pre><code"));
        assert!(out.trim_end().ends_with("</code></pre>"));
    }

    #[test]
    fn multi_class_annotation_is_highlighted() {
        let highlighter = Highlighter::new();
        let html = r#"<pre><code class="highlight language-rust">fn main() {}</code></pre>"#;

        let out = highlighter.rewrite(html).unwrap();

        assert!(out.contains("<span"), "expected syntect markup: {out}");
    }

    #[test]
    fn unknown_language_stays_plain() {
        let highlighter = Highlighter::new();
        let html = r#"<pre><code class="language-zzznotalang">plain body</code></pre>"#;

        let out = highlighter.rewrite(html).unwrap();

        assert!(out.contains("plain body"));
    }

    #[test]
    fn unannotated_code_is_untouched() {
        let highlighter = Highlighter::new();
        let html = "<p>before</p><pre><code>unhighlighted()</code></pre>";

        let out = highlighter.rewrite(html).unwrap();

        assert_eq!(out, html);
    }

    #[test]
    fn surrounding_structure_is_preserved() {
        let highlighter = Highlighter::new();
        let html = "<h1>Title</h1>\n<pre><code class=\"language-rust\">let x = 1;</code></pre>\n<p>after</p>";

        let out = highlighter.rewrite(html).unwrap();

        assert!(out.starts_with("<h1>Title</h1>"));
        assert!(out.ends_with("<p>after</p>"));
        assert!(!out.contains("<html"), "rewrite must not add a page shell");
    }

    #[test]
    fn entities_in_code_are_decoded_before_highlighting() {
        let highlighter = Highlighter::new();
        let html = r#"<pre><code class="language-rust">if a &lt; b {}</code></pre>"#;

        let out = highlighter.rewrite(html).unwrap();

        // The comparison survives the round trip, re-escaped by syntect.
        assert!(out.contains("&lt;"));
        assert!(!out.contains("&amp;lt;"), "double escaping: {out}");
    }

    #[test]
    fn language_token_parsing() {
        assert_eq!(
            language_from_class("language-rust"),
            Some("rust".to_string())
        );
        assert_eq!(
            language_from_class("highlight language-go extra"),
            Some("go".to_string())
        );
        assert_eq!(language_from_class("language-"), None);
        assert_eq!(language_from_class("plain"), None);
    }
}
