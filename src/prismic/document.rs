//! Wire types returned by the content API

use serde::{Deserialize, Serialize};

use crate::content::richtext::{self, RichText};

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

fn first_page() -> u32 {
    1
}

/// A raw document as stored upstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub first_publication_date: Option<String>,
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: DocumentData,
}

/// Post fields; anything left out of a `fetch` projection is defaulted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentData {
    pub title: Option<TextField>,
    pub subtitle: Option<TextField>,
    pub author: Option<TextField>,
    pub banner: Option<ImageField>,
    pub content: Vec<RawSection>,
}

/// Key-text fields come back as plain strings, title fields as rich text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Rich(RichText),
}

impl TextField {
    pub fn as_text(&self) -> String {
        match self {
            TextField::Plain(s) => s.clone(),
            TextField::Rich(blocks) => richtext::as_text(blocks),
        }
    }
}

/// Text of an optional field, empty when absent
pub fn text_of(field: &Option<TextField>) -> String {
    field.as_ref().map(TextField::as_text).unwrap_or_default()
}

/// Image field; an empty image is `{}` upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageField {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// A group entry of the `content` slice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSection {
    pub heading: Option<TextField>,
    pub body: RichText,
}
