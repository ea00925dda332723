//! Single-post loader and static path enumeration

use crate::config::SiteConfig;
use crate::content::{Post, PostSummary};
use crate::prismic::{ContentClient, ContentError, Predicate, QueryOptions};
use crate::state::PostNavigation;

use super::ContentRef;

/// What to do with a slug that was not pre-built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Fetch and render on first request, then keep the page
    OnDemand,
    /// Answer 404
    NotFound,
}

/// Slugs to pre-build plus the policy for everything else
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPaths {
    pub slugs: Vec<String>,
    pub fallback: FallbackPolicy,
}

impl StaticPaths {
    pub fn from_summaries(summaries: &[PostSummary], fallback: FallbackPolicy) -> Self {
        Self {
            slugs: summaries.iter().filter_map(|s| s.uid.clone()).collect(),
            fallback,
        }
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.iter().any(|s| s == slug)
    }
}

/// Props of a post page
#[derive(Debug, Clone)]
pub struct PostProps {
    pub post: Post,
    /// Positioned on `post`
    pub navigation: PostNavigation<PostSummary>,
    pub reading_time: usize,
    pub preview: bool,
}

/// Every post summary, in the API's ordering
pub async fn load_all_summaries(
    client: &ContentClient,
    config: &SiteConfig,
    content: &ContentRef,
) -> Result<Vec<PostSummary>, ContentError> {
    let options = QueryOptions {
        fetch: super::home::listing_fields(&config.prismic.document_type),
        page_size: Some(100),
        orderings: config.prismic.orderings.clone(),
        reference: content.as_query_ref().map(str::to_string),
        ..Default::default()
    };
    let predicates = [Predicate::document_type(&config.prismic.document_type)];
    let documents = client.query_all(&predicates, &options).await?;

    Ok(documents.iter().map(PostSummary::from).collect())
}

/// Enumerate the pre-buildable post paths
pub async fn static_paths(
    client: &ContentClient,
    config: &SiteConfig,
) -> Result<StaticPaths, ContentError> {
    let content = ContentRef::pin(client).await?;
    let summaries = load_all_summaries(client, config, &content).await?;
    Ok(StaticPaths::from_summaries(&summaries, fallback_policy(config)))
}

pub fn fallback_policy(config: &SiteConfig) -> FallbackPolicy {
    if config.fallback {
        FallbackPolicy::OnDemand
    } else {
        FallbackPolicy::NotFound
    }
}

/// Load a post by slug along with the full list for navigation
pub async fn load_post(
    client: &ContentClient,
    config: &SiteConfig,
    slug: &str,
    content: &ContentRef,
) -> Result<PostProps, ContentError> {
    let summaries = load_all_summaries(client, config, content).await?;
    load_post_with(client, config, slug, summaries, content).await
}

/// Load a post by slug, reusing an already fetched summary list
pub async fn load_post_with(
    client: &ContentClient,
    config: &SiteConfig,
    slug: &str,
    summaries: Vec<PostSummary>,
    content: &ContentRef,
) -> Result<PostProps, ContentError> {
    let document = client
        .get_by_uid(&config.prismic.document_type, slug, content.as_query_ref())
        .await?;
    let post = Post::from(document);

    let mut navigation = PostNavigation::new();
    navigation.insert_posts(summaries);
    if !navigation.seek_uid(slug) {
        tracing::debug!("Post {} is not in the listing; navigation disabled", slug);
        navigation.insert_posts(vec![post.summary()]);
    }

    let reading_time = post.reading_time(config.reading.words_per_minute);

    Ok(PostProps {
        post,
        navigation,
        reading_time,
        preview: content.is_preview(),
    })
}
