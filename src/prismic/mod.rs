//! Content API access: client, predicates and wire types

mod client;
pub mod document;
pub mod predicate;

pub use client::{ContentClient, QueryOptions};
pub use document::{ApiPage, Document};
pub use predicate::Predicate;

use thiserror::Error;

/// Errors raised while talking to the content API
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("content API exposes no master ref")]
    NoMasterRef,
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("cursor does not belong to the configured endpoint: {0}")]
    ForeignCursor(String),
}
