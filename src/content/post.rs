//! Post models

use serde::{Deserialize, Serialize};

use super::richtext::{self, RichText};
use crate::prismic::document::{text_of, Document, ImageField, RawSection};

/// Lightweight post record used by the listing and by navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: Option<String>,
    /// ISO-8601 timestamp as emitted upstream; formatted at render time
    pub first_publication_date: Option<String>,
    pub data: SummaryData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl From<&Document> for PostSummary {
    fn from(doc: &Document) -> Self {
        Self {
            uid: doc.uid.clone(),
            first_publication_date: doc.first_publication_date.clone(),
            data: SummaryData {
                title: text_of(&doc.data.title),
                subtitle: text_of(&doc.data.subtitle),
                author: text_of(&doc.data.author),
            },
        }
    }
}

/// A full post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub uid: Option<String>,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    pub data: PostData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Option<Banner>,
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
    pub alt: Option<String>,
}

/// One heading plus its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    pub heading: String,
    pub body: RichText,
}

impl ContentSection {
    /// Body serialized to HTML
    pub fn body_html(&self) -> String {
        richtext::as_html(&self.body)
    }

    /// Words in the body text; the heading is not counted
    fn word_count(&self) -> usize {
        richtext::as_text(&self.body).split_whitespace().count()
    }
}

impl From<Document> for Post {
    fn from(doc: Document) -> Self {
        let data = &doc.data;
        Self {
            uid: doc.uid.clone(),
            first_publication_date: doc.first_publication_date.clone(),
            last_publication_date: doc.last_publication_date.clone(),
            data: PostData {
                title: text_of(&data.title),
                subtitle: text_of(&data.subtitle),
                author: text_of(&data.author),
                banner: data.banner.as_ref().and_then(banner_of),
                content: data.content.iter().map(section_of).collect(),
            },
        }
    }
}

fn banner_of(image: &ImageField) -> Option<Banner> {
    image.url.as_ref().map(|url| Banner {
        url: url.clone(),
        alt: image.alt.clone(),
    })
}

fn section_of(raw: &RawSection) -> ContentSection {
    ContentSection {
        heading: text_of(&raw.heading),
        body: raw.body.clone(),
    }
}

impl Post {
    /// Total body words across every section
    pub fn word_count(&self) -> usize {
        self.data.content.iter().map(ContentSection::word_count).sum()
    }

    /// Estimated reading time in whole minutes, rounded up
    pub fn reading_time(&self, words_per_minute: usize) -> usize {
        reading_time(self.word_count(), words_per_minute)
    }

    pub fn summary(&self) -> PostSummary {
        PostSummary {
            uid: self.uid.clone(),
            first_publication_date: self.first_publication_date.clone(),
            data: SummaryData {
                title: self.data.title.clone(),
                subtitle: self.data.subtitle.clone(),
                author: self.data.author.clone(),
            },
        }
    }
}

/// `ceil(words / words_per_minute)`
pub fn reading_time(words: usize, words_per_minute: usize) -> usize {
    words.div_ceil(words_per_minute.max(1))
}
