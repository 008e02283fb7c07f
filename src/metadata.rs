//! Maps request paths to the preview metadata a page should advertise.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use ogserve_content::{ContentKind, ContentRecord, ContentStore};

const DEFAULT_TITLE: &str = "React SSR SEO App";
const DEFAULT_DESCRIPTION: &str =
    "A React app with Server-Side Rendering for dynamic social media previews";
const DEFAULT_IMAGE: &str = "https://via.placeholder.com/1200x630";
const DEFAULT_TYPE: &str = "website";

/// Route prefixes that map onto a content collection.
const ROUTES: &[(&str, ContentKind)] = &[
    ("/post/", ContentKind::Post),
    ("/product/", ContentKind::Product),
];

/// Title, description, image and Open Graph type for a single page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub image: String,
    #[serde(rename = "type")]
    pub page_type: String,
}

impl PageMetadata {
    /// The built-in site-wide metadata.
    pub fn site_default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            image: DEFAULT_IMAGE.to_owned(),
            page_type: DEFAULT_TYPE.to_owned(),
        }
    }

    pub fn from_record(record: &ContentRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            image: record.image.clone(),
            page_type: record.content_type.as_str().to_owned(),
        }
    }

    /// Replaces every blank field with the matching field of `defaults`.
    pub fn or_defaults(self, defaults: &PageMetadata) -> Self {
        fn pick(value: String, fallback: &str) -> String {
            if value.trim().is_empty() {
                fallback.to_owned()
            } else {
                value
            }
        }

        Self {
            title: pick(self.title, &defaults.title),
            description: pick(self.description, &defaults.description),
            image: pick(self.image, &defaults.image),
            page_type: pick(self.page_type, &defaults.page_type),
        }
    }
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self::site_default()
    }
}

/// Resolves paths such as `/post/1` or `/product/123` against a [`ContentStore`].
///
/// The resolver is immutable and cheap to clone; every call builds a fresh
/// [`PageMetadata`], so concurrent requests never see each other's values.
#[derive(Clone)]
pub struct MetadataResolver {
    store: Arc<dyn ContentStore>,
    defaults: PageMetadata,
    title_nonce: bool,
}

impl MetadataResolver {
    pub fn new(store: Arc<dyn ContentStore>, defaults: PageMetadata) -> Self {
        Self {
            store,
            defaults,
            title_nonce: false,
        }
    }

    /// Appends a random number to every resolved title.
    ///
    /// Breaks caching and exact-match assertions; only useful when checking
    /// whether a link unfurler re-fetched a page.
    pub fn with_title_nonce(mut self, enabled: bool) -> Self {
        self.title_nonce = enabled;
        self
    }

    pub fn resolve(&self, path: &str) -> PageMetadata {
        let path = strip_query(path);
        let metadata = match self.lookup(path) {
            Some(record) => PageMetadata::from_record(&record).or_defaults(&self.defaults),
            None => self.defaults.clone(),
        };

        tracing::debug!(path, title = %metadata.title, "resolved page metadata");

        if self.title_nonce {
            let nonce: u32 = rand::thread_rng().gen_range(0..10_000);
            PageMetadata {
                title: format!("{} {nonce}", metadata.title),
                ..metadata
            }
        } else {
            metadata
        }
    }

    fn lookup(&self, path: &str) -> Option<ContentRecord> {
        let (_, kind) = ROUTES
            .iter()
            .find(|(prefix, _)| path.starts_with(*prefix))?;
        // "/post/<id>/..." splits into ["", "post", "<id>", ...]
        let segment = path.split('/').nth(2)?;
        self.store.find_segment(*kind, segment)
    }
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
