//! Helper functions for templates
//!
//! Date formatting, URL building and the small HTML snippets the
//! templates cannot express on their own.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
