//! Rich text blocks and their text / HTML serializations

use serde::{Deserialize, Serialize};

use crate::helpers::escape_html;

/// A rich text field is an ordered list of blocks
pub type RichText = Vec<RichTextBlock>;

/// One block (paragraph, heading, list item, image, embed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub oembed: Option<serde_json::Value>,
}

impl RichTextBlock {
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.to_string(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }
}

/// Inline formatting; offsets are UTF-16 code units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Plain text of all blocks, joined by a single space
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Serialize blocks to HTML
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        html.push_str(&block_html(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn block_html(block: &RichTextBlock) -> String {
    let inner = || spans_html(&block.text, &block.spans);
    match block.kind.as_str() {
        "paragraph" => format!("<p>{}</p>", inner()),
        "preformatted" => format!("<pre>{}</pre>", inner()),
        "list-item" | "o-list-item" => format!("<li>{}</li>", inner()),
        "image" => format!(
            r#"<p class="block-img"><img src="{}" alt="{}"></p>"#,
            escape_html(block.url.as_deref().unwrap_or("")),
            escape_html(block.alt.as_deref().unwrap_or(""))
        ),
        "embed" => {
            let embed_html = block
                .oembed
                .as_ref()
                .and_then(|o| o.get("html"))
                .and_then(|h| h.as_str())
                .unwrap_or("");
            format!(r#"<div class="embed">{}</div>"#, embed_html)
        }
        kind => match heading_level(kind) {
            Some(level) => format!("<h{level}>{}</h{level}>", inner()),
            None => {
                tracing::debug!("Unknown rich text block type: {}", kind);
                format!("<p>{}</p>", inner())
            }
        },
    }
}

fn heading_level(kind: &str) -> Option<u8> {
    let level: u8 = kind.strip_prefix("heading")?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn open_tag(span: &Span) -> String {
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let url = span
                .data
                .as_ref()
                .and_then(|d| d.get("url"))
                .and_then(|u| u.as_str())
                .unwrap_or("#");
            format!(r#"<a href="{}">"#, escape_html(url))
        }
        "label" => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.get("label"))
                .and_then(|l| l.as_str())
                .unwrap_or("");
            format!(r#"<span class="{}">"#, escape_html(label))
        }
        _ => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
}

/// Apply spans to `text`, escaping the text itself
fn spans_html(text: &str, spans: &[Span]) -> String {
    if spans.is_empty() {
        return escape_html(text).replace('\n', "<br />");
    }

    let mut ordered: Vec<&Span> = spans.iter().filter(|s| s.start < s.end).collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::new();
    let mut open: Vec<&Span> = Vec::new();
    let mut pending = ordered.into_iter().peekable();
    let mut offset = 0usize;

    for ch in text.chars() {
        close_spans(&mut out, &mut open, offset);
        while let Some(span) = pending.next_if(|s| s.start <= offset) {
            out.push_str(&open_tag(span));
            open.push(span);
        }

        match ch {
            '\n' => out.push_str("<br />"),
            _ => out.push_str(&escape_html(ch.encode_utf8(&mut [0; 4]))),
        }
        offset += ch.len_utf16();
    }

    close_spans(&mut out, &mut open, usize::MAX);
    out
}

/// Close every span ending at `offset`. Spans opened inside one of them
/// but still running are closed with it and reopened, so tags stay nested.
fn close_spans<'a>(out: &mut String, open: &mut Vec<&'a Span>, offset: usize) {
    let Some(depth) = open.iter().position(|span| span.end <= offset) else {
        return;
    };

    let mut reopen = Vec::new();
    while open.len() > depth {
        if let Some(span) = open.pop() {
            out.push_str(close_tag(span));
            if span.end > offset {
                reopen.push(span);
            }
        }
    }
    for span in reopen.into_iter().rev() {
        out.push_str(&open_tag(span));
        open.push(span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: &str, text: &str) -> RichTextBlock {
        RichTextBlock {
            kind: kind.to_string(),
            ..RichTextBlock::paragraph(text)
        }
    }

    fn span(kind: &str, start: usize, end: usize) -> Span {
        Span {
            start,
            end,
            kind: kind.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_as_text_joins_blocks() {
        let blocks = vec![block("paragraph", "one two"), block("heading2", "three")];
        assert_eq!(as_text(&blocks), "one two three");
    }

    #[test]
    fn test_paragraph_and_heading() {
        let blocks = vec![block("heading2", "Title"), block("paragraph", "a < b")];
        assert_eq!(as_html(&blocks), "<h2>Title</h2><p>a &lt; b</p>");
    }

    #[test]
    fn test_list_items_are_grouped() {
        let blocks = vec![
            block("list-item", "a"),
            block("list-item", "b"),
            block("o-list-item", "c"),
            block("paragraph", "d"),
        ];
        assert_eq!(
            as_html(&blocks),
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>d</p>"
        );
    }

    #[test]
    fn test_spans() {
        let mut p = block("paragraph", "hello bold world");
        p.spans = vec![span("strong", 6, 10)];
        assert_eq!(as_html(&[p]), "<p>hello <strong>bold</strong> world</p>");
    }

    #[test]
    fn test_nested_spans_and_link() {
        let mut p = block("paragraph", "read the docs");
        let mut link = span("hyperlink", 5, 13);
        link.data = Some(serde_json::json!({"url": "https://example.com"}));
        p.spans = vec![link, span("em", 9, 13)];
        assert_eq!(
            as_html(&[p]),
            r#"<p>read <a href="https://example.com">the <em>docs</em></a></p>"#
        );
    }

    #[test]
    fn test_overlapping_spans_stay_nested() {
        let mut p = block("paragraph", "abcdefgh");
        p.spans = vec![span("strong", 0, 5), span("em", 3, 8)];
        assert_eq!(
            as_html(&[p]),
            "<p><strong>abc<em>de</em></strong><em>fgh</em></p>"
        );
    }

    #[test]
    fn test_span_offsets_are_utf16() {
        let mut p = block("paragraph", "é 🚀 ok");
        // "é" = 1 unit, " " = 1, rocket = 2, " " = 1 -> "ok" starts at 5
        p.spans = vec![span("strong", 5, 7)];
        assert_eq!(as_html(&[p]), "<p>é 🚀 <strong>ok</strong></p>");
    }

    #[test]
    fn test_image_block() {
        let mut img = block("image", "");
        img.url = Some("https://images.prismic.io/x.png".to_string());
        img.alt = Some("rocket".to_string());
        assert_eq!(
            as_html(&[img]),
            r#"<p class="block-img"><img src="https://images.prismic.io/x.png" alt="rocket"></p>"#
        );
    }
}
