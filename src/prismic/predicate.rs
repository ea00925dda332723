//! Query predicates for the documents search endpoint

use std::fmt;

/// A single predicate, rendered in the API's `[at(path,"value")]` syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match on a field path
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// `document.type` filter
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// Custom-type uid lookup (`my.<type>.uid`)
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", doc_type), uid)
    }

    pub fn id(id: &str) -> Self {
        Self::at("document.id", id)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => write!(f, "[at({},{})]", path, quote(value)),
        }
    }
}

/// Render a predicate list as the `q` query parameter
pub fn to_query(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(|p| p.to_string()).collect();
    format!("[{}]", inner)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
