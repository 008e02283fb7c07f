//! ogserve runtime crate.
//!
//! Serves a single-page application bundle over Axum and rewrites its HTML
//! shell per route, so link unfurlers (Facebook, X, WhatsApp, Slack) see the
//! right Open Graph and Twitter Card tags without running any JavaScript.

pub mod config;
pub mod context;
pub mod error;
pub mod inject;
pub mod metadata;
pub mod routes;
pub mod runtime;
pub mod template;

pub use crate::config::{ConfigError, ServerConfig, ServerConfigBuilder};
pub use crate::context::{PageRequest, PublicOrigin};
pub use crate::error::{ApiError, OgserveError, RenderError, Result};
pub use crate::inject::{HtmlTemplate, InjectError, html_escape, inject};
pub use crate::metadata::{MetadataResolver, PageMetadata};
pub use crate::routes::{AppState, StaticAssets, router};
pub use crate::runtime::{OgserveRuntime, run, serve};
pub use crate::template::TemplateSource;
pub use ogserve_content::{
    ContentDetails, ContentError, ContentKind, ContentRecord, ContentStore, ContentType,
    InMemoryStore,
};
