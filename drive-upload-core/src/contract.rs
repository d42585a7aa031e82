//! # contract: the object-store capability used by every pipeline stage
//!
//! This module defines the [`ObjectStore`] trait and the plain data it moves
//! around. Implementations connect to a real backend (the CLI crate ships a
//! Google Drive client) or stand in for one in tests.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; with the default `test-export-mocks`
//!   feature, downstream tests can use `MockObjectStore` for call-count checks.
//!
//! ## Naming
//! - Object names are not unique inside a folder. Anything that needs "the"
//!   object with a given name has to [`ObjectStore::list`] and deal with
//!   several matches.

use std::fmt;

use async_trait::async_trait;
use mockall::automock;

/// Boxed error returned by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// An object as reported by the remote store. Identity is `id`; `name` may repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub id: String,
    pub name: String,
    pub parents: Vec<String>,
}

/// Search scoped to a single `(name, parent)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectQuery {
    pub name: String,
    pub parent_id: String,
}

impl ObjectQuery {
    pub fn new(name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: parent_id.into(),
        }
    }

    /// Renders the query in the store's search language, e.g.
    /// `name = 'report.csv' and 'folder' in parents`.
    pub fn to_query_string(&self) -> String {
        format!(
            "name = '{}' and '{}' in parents",
            escape_literal(&self.name),
            escape_literal(&self.parent_id)
        )
    }
}

impl fmt::Display for ObjectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Escapes a value for use inside a single-quoted query literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// An object to be created. `content` is uploaded as the object's media.
#[derive(Clone, PartialEq, Eq)]
pub struct NewObject {
    pub name: String,
    pub parents: Vec<String>,
    pub content: Vec<u8>,
}

impl NewObject {
    pub fn new(name: impl Into<String>, parent_id: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            parents: vec![parent_id.into()],
            content,
        }
    }

    /// Short description for diagnostics. Never includes the content itself.
    pub fn describe(&self) -> String {
        format!(
            "{{name: {:?}, parents: {:?}, size: {} bytes}}",
            self.name,
            self.parents,
            self.content.len()
        )
    }
}

impl fmt::Debug for NewObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewObject")
            .field("name", &self.name)
            .field("parents", &self.parents)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Capability to list, create, update and download objects in a hierarchical store.
///
/// One handle is shared by reference across all stages and only used through `&self`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every object matching the query, in the order the store returns them.
    async fn list(&self, query: &ObjectQuery) -> Result<Vec<RemoteObject>, StoreError>;

    /// Create a new object and upload its content.
    async fn create(&self, object: NewObject) -> Result<RemoteObject, StoreError>;

    /// Replace the content of an existing object and reassert its name.
    /// The object's id and parents stay as they are.
    async fn update(
        &self,
        id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<RemoteObject, StoreError>;

    /// Full content of an object.
    async fn download(&self, id: &str) -> Result<Vec<u8>, StoreError>;
}
