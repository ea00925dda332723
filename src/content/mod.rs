//! Content module - internal post representation and rich text

mod post;
pub mod richtext;

pub use post::{reading_time, Banner, ContentSection, Post, PostData, PostSummary, SummaryData};
pub use richtext::{RichText, RichTextBlock};
