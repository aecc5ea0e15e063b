//! HTML sectionizer, driven by a `scraper` DOM walk

use ego_tree::NodeRef;
use scraper::{Html, Node};

use super::{sections_to_chunks, HeadingStack};
use crate::cancel::CancellationToken;
use crate::chunk::ChunkResult;
use crate::chunker::{matches_extension, Chunker};
use crate::error::ChunkError;
use crate::metadata::ContentKind;
use crate::options::ChunkOptions;

const EXTENSIONS: &[&str] = &[".html", ".htm", ".xhtml"];
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "head", "meta", "link"];
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "tr", "section", "article", "blockquote", "pre", "br", "table", "ul", "ol",
];

/// Splits HTML along `h1`–`h6` boundaries found by walking the parsed DOM.
#[derive(Debug, Default)]
pub struct HtmlChunker;

impl HtmlChunker {
    pub fn new() -> Self {
        Self
    }
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn element_text(node: NodeRef<Node>) -> String {
    let mut out = String::new();
    for child in node.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(_) => out.push_str(&element_text(child)),
            _ => {}
        }
    }
    out
}

fn walk(
    node: NodeRef<Node>,
    stack: &mut HeadingStack,
    cancel: &CancellationToken,
) -> Result<(), ChunkError> {
    if cancel.is_cancelled() {
        return Err(ChunkError::Cancelled);
    }
    match node.value() {
        Node::Element(elem) => {
            let name = elem.name();
            if SKIPPED_TAGS.contains(&name) {
                return Ok(());
            }
            if let Some(level) = heading_level(name) {
                let heading_text = element_text(node);
                let heading_line = format!("{}\n", heading_text.trim());
                stack.start_heading(heading_text.trim(), level, &heading_line);
                return Ok(());
            }
            let is_block = BLOCK_TAGS.contains(&name);
            for child in node.children() {
                walk(child, stack, cancel)?;
            }
            if is_block {
                stack.push_text("\n\n");
            }
        }
        Node::Text(t) => {
            stack.push_text(t);
        }
        _ => {}
    }
    Ok(())
}

impl Chunker for HtmlChunker {
    fn name(&self) -> &'static str {
        "html"
    }

    fn priority(&self) -> i32 {
        75
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("text/html") || mime.eq_ignore_ascii_case("application/xhtml+xml")
            {
                return true;
            }
        }
        language_hint.is_some_and(|hint| matches_extension(hint, EXTENSIONS))
    }

    fn chunk(
        &self,
        content: &[u8],
        options: &ChunkOptions,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ChunkError> {
        let text = String::from_utf8_lossy(content).into_owned();
        let mut warnings = Vec::new();
        let document = Html::parse_document(&text);
        let mut stack = HeadingStack::new();

        walk(*document.root_element(), &mut stack, cancel)?;

        let sections = stack.finish();
        let chunks = sections_to_chunks(sections, ContentKind::Markdown, options, &mut warnings);

        Ok(ChunkResult::new(chunks, warnings, self.name(), content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_handle_html_extension() {
        let c = HtmlChunker::new();
        assert!(c.can_handle(None, Some("index.html")));
        assert!(c.can_handle(Some("text/html"), None));
    }

    #[test]
    fn heading_tag_starts_a_section() {
        let c = HtmlChunker::new();
        let html = "<html><body><h1>Title</h1><p>Body text.</p></body></html>";
        let result = c
            .chunk(html.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
    }

    #[test]
    fn script_and_style_content_is_skipped() {
        let c = HtmlChunker::new();
        let html = "<html><head><style>h1{color:red}</style></head><body><h1>T</h1><script>var h2=1;</script><p>body</p></body></html>";
        let result = c
            .chunk(html.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert!(!result.chunks[0].content.contains("color:red"));
    }
}
