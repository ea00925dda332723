//! HTML helper functions

use crate::config::SiteConfig;

const UTTERANCES_SRC: &str = "https://utteranc.es/client.js";

/// Escape text for use in HTML content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Comment widget script tag, `None` when no repository is configured
///
/// # Examples
/// ```ignore
/// comments_script(&config) // -> <script src="https://utteranc.es/client.js" repo="owner/repo" ...
/// ```
pub fn comments_script(config: &SiteConfig) -> Option<String> {
    let repo = config.comments.repo.as_deref()?.trim();
    if repo.is_empty() {
        return None;
    }

    Some(format!(
        r#"<script src="{}" repo="{}" issue-term="{}" theme="{}" crossorigin="anonymous" async></script>"#,
        UTTERANCES_SRC,
        escape_html(repo),
        escape_html(&config.comments.issue_term),
        escape_html(&config.comments.theme)
    ))
}

/// Generate meta generator tag
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="spacetraveling {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}
