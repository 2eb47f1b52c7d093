//! High-level store operations over the document collections.

pub mod admin;
pub mod engagement;
pub mod groups;
pub mod posts;
pub mod users;

use crate::{
    collection::Collection,
    keys::KeyContext,
    models::{Category, Comment, Follow, Group, Like, Post, Reply, User},
};

/// Entry point for every store operation. Holds only the key prefix;
/// connections are passed per call so callers control pooling.
#[derive(Debug, Clone)]
pub struct Store {
    prefix: String,
}

impl Store {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn key_context(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix)
    }

    pub fn users(&self) -> Collection<User> {
        Collection::new(self.prefix.clone())
    }

    pub fn posts(&self) -> Collection<Post> {
        Collection::new(self.prefix.clone())
    }

    pub fn likes(&self) -> Collection<Like> {
        Collection::new(self.prefix.clone())
    }

    pub fn follows(&self) -> Collection<Follow> {
        Collection::new(self.prefix.clone())
    }

    pub fn comments(&self) -> Collection<Comment> {
        Collection::new(self.prefix.clone())
    }

    pub fn replies(&self) -> Collection<Reply> {
        Collection::new(self.prefix.clone())
    }

    pub fn groups(&self) -> Collection<Group> {
        Collection::new(self.prefix.clone())
    }

    pub fn categories(&self) -> Collection<Category> {
        Collection::new(self.prefix.clone())
    }
}
