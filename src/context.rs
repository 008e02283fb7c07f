use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::uri::Authority;

const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";
const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

/// Origin configured for canonical URLs, carried as a request extension.
#[derive(Clone, Debug, Default)]
pub struct PublicOrigin(pub Option<String>);

/// Request-scoped view of a page request: its path and the canonical URL
/// advertised through `og:url`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    path: String,
    path_and_query: String,
    canonical_url: String,
}

impl PageRequest {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    fn from_parts(parts: &Parts) -> Self {
        let path = parts.uri.path().to_owned();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| path.clone());

        let origin = match parts.extensions.get::<PublicOrigin>() {
            Some(PublicOrigin(Some(origin))) => origin.trim_end_matches('/').to_owned(),
            _ => request_origin(parts),
        };
        let canonical_url = format!("{origin}{path}");

        Self {
            path,
            path_and_query,
            canonical_url,
        }
    }
}

/// Rebuilds `scheme://host` from proxy headers, the `Host` header or the URI.
///
/// Header values that are not a plain `http`/`https` scheme or a bare
/// `host[:port]` authority are ignored.
fn request_origin(parts: &Parts) -> String {
    let headers = &parts.headers;
    let scheme = headers
        .get(FORWARDED_PROTO_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| value == "http" || value == "https")
        .or_else(|| parts.uri.scheme_str().map(|value| value.to_owned()))
        .unwrap_or_else(|| "http".to_owned());
    let host = [headers.get(FORWARDED_HOST_HEADER), headers.get(HOST)]
        .into_iter()
        .flatten()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| parse_host(value.split(',').next().unwrap_or_default()))
        .or_else(|| parts.uri.authority().map(|authority| authority.to_string()))
        .unwrap_or_else(|| "localhost".to_owned());

    format!("{scheme}://{host}")
}

fn parse_host(value: &str) -> Option<String> {
    let authority = value.trim().parse::<Authority>().ok()?;
    // userinfo has no place in a Host header
    (!authority.as_str().contains('@')).then(|| authority.as_str().to_owned())
}

#[async_trait]
impl<S> FromRequestParts<S> for PageRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
