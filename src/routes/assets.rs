//! Static files from the front-end bundle directory.

use std::path::{Component, Path, PathBuf};

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Serves files from a bundle directory, never the HTML template itself.
#[derive(Clone, Debug)]
pub struct StaticAssets {
    root: PathBuf,
    excluded: Option<PathBuf>,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excluded: None,
        }
    }

    /// Keeps `path` (normally the template) from being served raw.
    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded = Some(path.into());
        self
    }

    /// Maps a request path onto an existing file inside the root.
    ///
    /// Only paths whose last segment carries an extension qualify, so client
    /// routes such as `/post/1` always reach the page handler.
    pub async fn lookup(&self, request_path: &str) -> Option<PathBuf> {
        let relative = sanitize(request_path)?;
        relative.extension()?;

        let candidate = self.root.join(relative);
        match tokio::fs::metadata(&candidate).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return None,
        }

        if self.is_excluded(&candidate).await {
            return None;
        }
        Some(candidate)
    }

    /// Compares resolved paths so `./public/index.html` and an absolute
    /// spelling of the same file still match.
    async fn is_excluded(&self, candidate: &Path) -> bool {
        let Some(excluded) = &self.excluded else {
            return false;
        };
        match (
            tokio::fs::canonicalize(candidate).await,
            tokio::fs::canonicalize(excluded).await,
        ) {
            (Ok(candidate), Ok(excluded)) => candidate == excluded,
            _ => candidate == excluded.as_path(),
        }
    }

    pub async fn serve(&self, path: &Path) -> Response {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let mime = mime_guess::from_path(path).first_or_octet_stream();
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, mime.as_ref())],
                    bytes,
                )
                    .into_response()
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to read static asset");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Turns `/assets/app.js` into `assets/app.js`, refusing anything that could
/// climb out of the root.
fn sanitize(request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.contains('\\') {
        return None;
    }

    let relative = Path::new(trimmed);
    relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
        .then(|| relative.to_path_buf())
}
