//! Page data loaders
//!
//! Each loader queries the content API once per page and reshapes the raw
//! documents into the props the templates render.

pub mod home;
pub mod post;

pub use home::{load_home, HomeProps, PostPagination};
pub use post::{
    fallback_policy, load_all_summaries, load_post, load_post_with, static_paths,
    FallbackPolicy, PostProps, StaticPaths,
};

use crate::prismic::{ContentClient, ContentError};

/// Content version a load reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    /// Whatever is published when each query runs
    Published,
    /// One published version, resolved up front
    Pinned(String),
    /// Draft content behind a preview token
    Preview(String),
}

impl ContentRef {
    /// Resolve the current master ref once so later queries agree
    pub async fn pin(client: &ContentClient) -> Result<Self, ContentError> {
        Ok(Self::Pinned(client.master_ref().await?))
    }

    /// Ref to send with a query; `None` lets the client resolve the master ref
    pub fn as_query_ref(&self) -> Option<&str> {
        match self {
            Self::Published => None,
            Self::Pinned(r) | Self::Preview(r) => Some(r),
        }
    }

    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview(_))
    }
}
