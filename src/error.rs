use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::inject::InjectError;
use ogserve_content::{ContentError, ContentKind};

pub type Result<T> = std::result::Result<T, OgserveError>;

/// Startup-level failures. Request failures never surface here.
#[derive(Debug, Error)]
pub enum OgserveError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by the JSON API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown or malformed id.
    #[error("{0} not found")]
    NotFound(ContentKind),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Errors raised while producing an HTML page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Injection(#[from] InjectError),
}

impl IntoResponse for RenderError {
    /// Details stay in the server log; clients only get a generic body.
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
