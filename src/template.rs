use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::RenderError;

/// Where the HTML shell comes from.
#[derive(Clone, Debug)]
pub enum TemplateSource {
    /// A template held in memory, mostly for tests and embedding.
    Inline(Arc<str>),
    /// Read from disk on first successful use, then served from memory.
    Cached {
        path: PathBuf,
        cell: Arc<OnceCell<Arc<str>>>,
    },
    /// Read from disk on every request, for a bundle that is being rebuilt.
    Reload { path: PathBuf },
}

impl TemplateSource {
    pub fn inline(html: impl Into<String>) -> Self {
        Self::Inline(Arc::from(html.into()))
    }

    pub fn cached(path: impl Into<PathBuf>) -> Self {
        Self::Cached {
            path: path.into(),
            cell: Arc::new(OnceCell::new()),
        }
    }

    pub fn reload(path: impl Into<PathBuf>) -> Self {
        Self::Reload { path: path.into() }
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Inline(_) => None,
            Self::Cached { path, .. } | Self::Reload { path } => Some(path.as_path()),
        }
    }

    /// Returns the template text.
    ///
    /// A failed read of a cached template is not remembered; the next call
    /// tries the file again.
    pub async fn load(&self) -> Result<Arc<str>, RenderError> {
        match self {
            Self::Inline(html) => Ok(html.clone()),
            Self::Cached { path, cell } => cell.get_or_try_init(|| read(path)).await.cloned(),
            Self::Reload { path } => read(path).await,
        }
    }

    /// Warms the cache at startup. A missing bundle is only worth a warning:
    /// requests keep answering with 500 until the file shows up.
    pub async fn preload(&self) {
        match self.load().await {
            Ok(html) => tracing::debug!(bytes = html.len(), "template loaded"),
            Err(err) => tracing::warn!(error = %err, "template not available yet"),
        }
    }
}

async fn read(path: &Path) -> Result<Arc<str>, RenderError> {
    tokio::fs::read_to_string(path)
        .await
        .map(Arc::from)
        .map_err(|source| RenderError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })
}
