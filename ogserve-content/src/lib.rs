//! Read-only content repository backing the ogserve front door.
//!
//! Posts and products live in independent id spaces. Everything here is
//! immutable once constructed; the server shares a single store behind an
//! `Arc<dyn ContentStore>` for the lifetime of the process.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

mod seed;

/// The two collections the store knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Post,
    Product,
}

impl ContentKind {
    /// Human readable label, used in "not found" messages.
    pub fn label(&self) -> &'static str {
        match self {
            ContentKind::Post => "Post",
            ContentKind::Product => "Product",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Open Graph object type carried by every record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Product,
    #[default]
    Website,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Product => "product",
            ContentType::Website => "website",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single post or product.
///
/// The common fields are what the metadata resolver needs; anything
/// type-specific is flattened next to them when serialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "type", default)]
    pub content_type: ContentType,
    #[serde(flatten)]
    pub details: ContentDetails,
}

/// Type-specific record fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentDetails {
    Post(PostDetails),
    Product(ProductDetails),
    /// Whatever else a content file chooses to carry.
    Other(BTreeMap<String, Value>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostDetails {
    pub author: String,
    pub date: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub price: f64,
    pub currency: String,
    pub category: String,
}

/// Read-only repository of content records.
///
/// Implementors only need [`ContentStore::list`]; lookups fall back to a
/// linear scan, which is fine for the handful of records a demo site holds.
pub trait ContentStore: Send + Sync {
    /// Returns every record of the given kind, in storage order.
    fn list(&self, kind: ContentKind) -> Vec<ContentRecord>;

    /// Looks up a record by id within its kind.
    fn find(&self, kind: ContentKind, id: u64) -> Option<ContentRecord> {
        self.list(kind).into_iter().find(|record| record.id == id)
    }

    /// Looks up a record by a raw path segment.
    ///
    /// Non-numeric segments are treated exactly like unknown ids: `None`.
    fn find_segment(&self, kind: ContentKind, segment: &str) -> Option<ContentRecord> {
        let id = segment.parse::<u64>().ok()?;
        self.find(kind, id)
    }
}

/// Process-lifetime store holding both collections in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    posts: Vec<ContentRecord>,
    products: Vec<ContentRecord>,
}

#[derive(Deserialize)]
struct ContentFile {
    #[serde(default)]
    posts: Vec<ContentRecord>,
    #[serde(default)]
    products: Vec<ContentRecord>,
}

impl InMemoryStore {
    /// Builds a store from explicit collections, rejecting duplicate ids per kind.
    pub fn new(
        posts: Vec<ContentRecord>,
        products: Vec<ContentRecord>,
    ) -> Result<Self, ContentError> {
        ensure_unique(ContentKind::Post, &posts)?;
        ensure_unique(ContentKind::Product, &products)?;
        Ok(Self { posts, products })
    }

    /// The built-in demo content.
    pub fn seeded() -> Self {
        Self {
            posts: seed::posts(),
            products: seed::products(),
        }
    }

    /// Parses a `{"posts": [...], "products": [...]}` document.
    pub fn from_json_str(raw: &str) -> Result<Self, ContentError> {
        let file: ContentFile = serde_json::from_str(raw)?;
        Self::new(file.posts, file.products)
    }

    /// Reads and parses a content file from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    fn collection(&self, kind: ContentKind) -> &[ContentRecord] {
        match kind {
            ContentKind::Post => &self.posts,
            ContentKind::Product => &self.products,
        }
    }
}

impl ContentStore for InMemoryStore {
    fn list(&self, kind: ContentKind) -> Vec<ContentRecord> {
        self.collection(kind).to_vec()
    }

    fn find(&self, kind: ContentKind, id: u64) -> Option<ContentRecord> {
        self.collection(kind)
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }
}

fn ensure_unique(kind: ContentKind, records: &[ContentRecord]) -> Result<(), ContentError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id) {
            return Err(ContentError::DuplicateId {
                kind,
                id: record.id,
            });
        }
    }
    Ok(())
}

/// Errors raised while building a store from external data.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid content document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: ContentKind, id: u64 },
}
