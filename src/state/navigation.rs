//! Next / previous traversal over an ordered post list

use serde::Serialize;

use super::CursorList;
use crate::content::PostSummary;

/// Ordered summaries plus the position of the post being viewed
#[derive(Debug, Clone, PartialEq)]
pub struct PostNavigation<T = PostSummary> {
    list: CursorList<T>,
}

impl<T> Default for PostNavigation<T> {
    fn default() -> Self {
        Self {
            list: CursorList::new(),
        }
    }
}

impl<T> PostNavigation<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace the navigation list
    pub fn insert_posts(&mut self, posts: Vec<T>) {
        self.list.replace(posts);
    }

    pub fn posts(&self) -> &[T] {
        self.list.items()
    }

    pub fn current_post_index(&self) -> usize {
        self.list.index()
    }

    pub fn current(&self) -> Option<&T> {
        self.list.current()
    }

    pub fn has_next_post(&self) -> bool {
        self.list.has_next()
    }

    pub fn has_previous_post(&self) -> bool {
        self.list.has_previous()
    }

    /// Advance to the next post; a no-op returning false at the end
    pub fn next_post(&mut self) -> bool {
        self.list.advance()
    }

    /// Step back to the previous post; a no-op returning false at the start
    pub fn previous_post(&mut self) -> bool {
        self.list.retreat()
    }

    pub fn peek_next(&self) -> Option<&T> {
        self.list.peek_next()
    }

    pub fn peek_previous(&self) -> Option<&T> {
        self.list.peek_previous()
    }

    pub fn seek(&mut self, index: usize) -> bool {
        self.list.seek(index)
    }
}

impl PostNavigation<PostSummary> {
    /// Position on the post with `uid`
    pub fn seek_uid(&mut self, uid: &str) -> bool {
        self.list.seek_by(|p| p.uid.as_deref() == Some(uid))
    }

    /// Prev/next links for the current post
    pub fn links(&self) -> NavLinks {
        NavLinks {
            previous: self.peek_previous().and_then(NavLink::from_summary),
            next: self.peek_next().and_then(NavLink::from_summary),
        }
    }
}

/// Link data handed to the post template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub uid: String,
    pub title: String,
}

impl NavLink {
    fn from_summary(summary: &PostSummary) -> Option<Self> {
        Some(Self {
            uid: summary.uid.clone()?,
            title: summary.data.title.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavLinks {
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
}
