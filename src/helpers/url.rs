//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/images/logo.svg") // -> "/blog/images/logo.svg"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/hello/") // -> "https://example.com/blog/post/hello/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of a post page
pub fn post_path(config: &SiteConfig, uid: &str) -> String {
    url_for(config, &format!("post/{}", uid))
}

/// Link resolver: where a document of `doc_type` lives on the site
pub fn resolve_document_link(config: &SiteConfig, doc_type: &str, uid: Option<&str>) -> String {
    match uid {
        Some(uid) if doc_type == config.prismic.document_type => post_path(config, uid),
        _ => url_for(config, "/"),
    }
}
