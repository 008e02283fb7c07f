use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};

use crate::context::PageRequest;
use crate::error::RenderError;
use crate::inject::inject;
use crate::routes::AppState;

/// Catch-all: a static asset when one matches, otherwise the HTML shell with
/// the route's preview metadata injected.
pub async fn page(State(state): State<AppState>, request: PageRequest) -> Response {
    if let Some(assets) = &state.assets {
        if let Some(file) = assets.lookup(request.path()).await {
            return assets.serve(&file).await;
        }
    }

    match render(&state, &request).await {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!(path = %request.path_and_query(), error = %err, "failed to render page");
            err.into_response()
        }
    }
}

async fn render(state: &AppState, request: &PageRequest) -> Result<String, RenderError> {
    let metadata = state.resolver.resolve(request.path_and_query());
    let template = state.template.load().await?;
    Ok(inject(&template, &metadata, request.canonical_url())?)
}
