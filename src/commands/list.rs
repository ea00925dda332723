//! List site content

use anyhow::Result;
use tokio::sync::Mutex;

use crate::content::PostSummary;
use crate::loader::{self, ContentRef};
use crate::state::Listing;
use crate::Site;

/// List site content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    let client = site.client()?;

    match content_type {
        "post" | "posts" => {
            let home = loader::load_home(&client, &site.config, &ContentRef::Published).await?;
            let state = Mutex::new(home.listing());

            // Walk the listing the way the "load more" button does
            while state.lock().await.can_load_more() {
                let appended = Listing::load_more(&state, &client).await?;
                tracing::debug!("Appended {} posts", appended);
            }

            let listing = state.into_inner();
            println!("Posts ({}):", listing.posts().len());
            for post in listing.posts() {
                println!("  {}", describe(post));
            }
        }
        "path" | "paths" => {
            let paths = loader::static_paths(&client, &site.config).await?;
            println!("Paths ({}, fallback {:?}):", paths.slugs.len(), paths.fallback);
            for slug in &paths.slugs {
                println!("  {}", crate::helpers::post_path(&site.config, slug));
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, path", content_type);
        }
    }

    Ok(())
}

fn describe(post: &PostSummary) -> String {
    let date = post
        .first_publication_date
        .as_deref()
        .and_then(crate::helpers::parse_timestamp)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());

    format!(
        "{} - {} [{}]",
        date,
        post.data.title,
        post.uid.as_deref().unwrap_or("-")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SummaryData;

    #[test]
    fn test_describe() {
        let post = PostSummary {
            uid: Some("hello".to_string()),
            first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
            data: SummaryData {
                title: "Hello".to_string(),
                subtitle: String::new(),
                author: String::new(),
            },
        };
        assert_eq!(describe(&post), "2021-03-15 - Hello [hello]");
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), crate::config::SiteConfig::default());
        assert!(run(&site, "tags").await.is_err());
    }
}
