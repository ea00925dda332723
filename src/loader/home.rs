//! Listing page loader

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::PostSummary;
use crate::prismic::{ApiPage, ContentClient, ContentError, Predicate, QueryOptions};
use crate::state::Listing;

use super::ContentRef;

/// First page of posts plus the cursor to the rest
#[derive(Debug, Clone, Serialize)]
pub struct PostPagination {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl From<ApiPage> for PostPagination {
    fn from(page: ApiPage) -> Self {
        Self {
            results: page.results.iter().map(PostSummary::from).collect(),
            next_page: page.next_page,
        }
    }
}

/// Props of the listing page
#[derive(Debug, Clone, Serialize)]
pub struct HomeProps {
    pub posts_pagination: PostPagination,
    pub preview: bool,
}

impl HomeProps {
    /// Seed listing state from the loaded page
    pub fn listing(&self) -> Listing<PostSummary> {
        Listing::new(
            self.posts_pagination.results.clone(),
            self.posts_pagination.next_page.clone(),
        )
    }
}

/// Field projection used by the listing
pub fn listing_fields(doc_type: &str) -> Vec<String> {
    ["title", "subtitle", "author", "last_publication_date"]
        .iter()
        .map(|field| format!("{}.{}", doc_type, field))
        .collect()
}

/// Query for the first listing page
pub fn listing_query(config: &SiteConfig, content: &ContentRef) -> QueryOptions {
    QueryOptions {
        fetch: listing_fields(&config.prismic.document_type),
        page_size: Some(config.prismic.page_size),
        page: None,
        orderings: config.prismic.orderings.clone(),
        reference: content.as_query_ref().map(str::to_string),
    }
}

/// Load the listing page props from the given content version
pub async fn load_home(
    client: &ContentClient,
    config: &SiteConfig,
    content: &ContentRef,
) -> Result<HomeProps, ContentError> {
    let predicates = [Predicate::document_type(&config.prismic.document_type)];
    let page = client
        .query(&predicates, &listing_query(config, content))
        .await?;

    tracing::debug!(
        "Loaded {} posts for the listing (more: {})",
        page.results.len(),
        page.next_page.is_some()
    );

    Ok(HomeProps {
        posts_pagination: page.into(),
        preview: content.is_preview(),
    })
}

/// Load the page behind a `next_page` cursor
pub async fn load_more(client: &ContentClient, cursor: &str) -> Result<PostPagination, ContentError> {
    Ok(client.fetch_page(cursor).await?.into())
}
