//! The HTTP front door: JSON API first, then static assets, then pages.

use std::sync::Arc;

use axum::Router;
use axum::extract::Extension;
use axum::routing::get;

use ogserve_content::{ContentStore, InMemoryStore};

use crate::config::ServerConfig;
use crate::context::PublicOrigin;
use crate::error::Result;
use crate::metadata::{MetadataResolver, PageMetadata};
use crate::template::TemplateSource;

pub mod api;
pub mod assets;
pub mod pages;

pub use assets::StaticAssets;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub resolver: MetadataResolver,
    pub template: TemplateSource,
    pub assets: Option<StaticAssets>,
    pub public_origin: Option<String>,
}

impl AppState {
    /// State with the built-in site defaults, no static assets and origins
    /// derived from request headers.
    pub fn new(store: Arc<dyn ContentStore>, template: TemplateSource) -> Self {
        let resolver = MetadataResolver::new(store.clone(), PageMetadata::site_default());
        Self {
            store,
            resolver,
            template,
            assets: None,
            public_origin: None,
        }
    }

    /// Loads content and wires the template and bundle directory from `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let store: Arc<dyn ContentStore> = match &config.content_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading content file");
                Arc::new(InMemoryStore::from_json_file(path)?)
            }
            None => Arc::new(InMemoryStore::seeded()),
        };

        let template = if config.template_reload {
            TemplateSource::reload(&config.template_path)
        } else {
            TemplateSource::cached(&config.template_path)
        };

        let resolver = MetadataResolver::new(store.clone(), config.defaults.clone())
            .with_title_nonce(config.title_nonce);
        let assets = StaticAssets::new(&config.static_dir).excluding(&config.template_path);

        Ok(Self {
            store,
            resolver,
            template,
            assets: Some(assets),
            public_origin: config.public_origin.clone(),
        })
    }

    pub fn with_resolver(mut self, resolver: MetadataResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_assets(mut self, assets: StaticAssets) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_public_origin(mut self, origin: impl Into<String>) -> Self {
        self.public_origin = Some(origin.into());
        self
    }
}

/// Assembles the full application router.
pub fn router(state: AppState) -> Router {
    let origin = PublicOrigin(state.public_origin.clone());

    Router::new()
        .route("/healthz", get(health))
        .route("/posts", get(api::list_posts))
        .route("/posts/:id", get(api::get_post))
        .route("/products", get(api::list_products))
        .route("/products/:id", get(api::get_product))
        .fallback(pages::page)
        .with_state(state)
        .layer(Extension(origin))
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use tower::ServiceExt;

    const TEMPLATE: &str = "<!doctype html><html><head><title>Shell</title></head>\
                            <body><div id=\"root\"></div></body></html>";

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(InMemoryStore::seeded()),
            TemplateSource::inline(TEMPLATE),
        )
        .with_public_origin("https://preview.example");
        router(state)
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn post_page_carries_its_preview_tags() {
        let response = get(app(), "/post/1").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );

        let html = body_text(response).await;
        assert!(html.contains(
            r#"<meta property="og:title" content="Amazing Post About React SSR">"#
        ));
        assert!(html.contains("<title>Amazing Post About React SSR</title>"));
        assert!(html.contains(
            r#"<meta property="og:url" content="https://preview.example/post/1">"#
        ));
    }

    #[tokio::test]
    async fn unknown_post_page_uses_site_defaults() {
        let response = get(app(), "/post/999").await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        let defaults = PageMetadata::site_default();
        assert!(html.contains(&format!("<title>{}</title>", defaults.title)));
        assert!(html.contains(&format!(
            r#"<meta property="og:description" content="{}">"#,
            defaults.description
        )));
        assert!(html.contains(r#"<meta property="og:type" content="website">"#));
    }

    #[tokio::test]
    async fn api_lists_and_finds_records() {
        let response = get(app(), "/posts").await;
        assert_eq!(response.status(), StatusCode::OK);
        let posts: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(posts.as_array().unwrap().len(), 3);

        let response = get(app(), "/products/123").await;
        assert_eq!(response.status(), StatusCode::OK);
        let product: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(product["id"], 123);
        assert_eq!(product["type"], "product");
        assert_eq!(product["currency"], "USD");
    }

    #[tokio::test]
    async fn api_misses_are_json_404s() {
        let response = get(app(), "/posts/999").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, r#"{"message":"Post not found"}"#);

        let response = get(app(), "/posts/abc").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, r#"{"message":"Post not found"}"#);

        let response = get(app(), "/products/1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_text(response).await,
            r#"{"message":"Product not found"}"#
        );
    }

    #[tokio::test]
    async fn unreadable_template_is_a_plain_500() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(
            Arc::new(InMemoryStore::seeded()),
            TemplateSource::cached(dir.path().join("missing.html")),
        );

        let response = get(router(state), "/post/1").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn serves_static_assets_before_pages() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();
        std::fs::write(dir.path().join("index.html"), TEMPLATE).unwrap();

        let config = ServerConfig::builder().static_dir(dir.path()).build();
        let app = router(AppState::from_config(&config).unwrap());

        let response = get(app.clone(), "/app.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains("javascript"));
        assert_eq!(body_text(response).await, "console.log('hi');");

        // the template is only ever served through injection
        let response = get(app.clone(), "/index.html").await;
        let html = body_text(response).await;
        assert!(html.contains("og:title"));

        let response = get(app, "/product/456").await;
        let html = body_text(response).await;
        assert!(html.contains("<title>Smart Fitness Watch</title>"));
        assert!(html.contains(r#"<meta property="og:url" content="http://localhost/product/456">"#));
    }

    #[tokio::test]
    async fn concurrent_pages_do_not_share_metadata() {
        let app = app();
        let routes = [
            ("/post/1", "Amazing Post About React SSR"),
            ("/post/2", "Social Media Optimization Guide"),
            ("/product/123", "Premium Wireless Headphones"),
            ("/", "React SSR SEO App"),
        ];

        let mut handles = Vec::new();
        for round in 0..8 {
            for (path, title) in routes {
                let app = app.clone();
                handles.push(tokio::spawn(async move {
                    let uri = format!("{path}?round={round}");
                    let html = body_text(get(app, &uri).await).await;
                    (title, html)
                }));
            }
        }

        for handle in handles {
            let (title, html) = handle.await.unwrap();
            assert!(html.contains(&format!("<title>{title}</title>")));
            assert_eq!(html.matches("<title>").count(), 1);
        }
    }

    #[tokio::test]
    async fn og_url_stays_inside_its_attribute() {
        let response = get(app(), "/post/1\"onload=\"x").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(
            r#"<meta property="og:url" content="https://preview.example/post/1&quot;onload=&quot;x">"#
        ));
        assert!(!html.contains(r#""onload=""#));

        let app = router(AppState::new(
            Arc::new(InMemoryStore::seeded()),
            TemplateSource::inline(TEMPLATE),
        ));
        let request = Request::builder()
            .uri("/post/1")
            .header("host", "preview.test")
            .header(
                "x-forwarded-host",
                r#"evil.example"><script>alert(1)</script><x y=""#,
            )
            .body(Body::empty())
            .unwrap();
        let html = body_text(app.oneshot(request).await.unwrap()).await;
        assert!(html.contains(r#"<meta property="og:url" content="http://preview.test/post/1">"#));
        assert!(!html.contains("<script>alert(1)"));
        assert!(!html.contains("evil.example"));
    }

    #[tokio::test]
    async fn custom_resolver_and_assets_are_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("robots.txt"), "User-agent: *").unwrap();

        let store: Arc<dyn ContentStore> = Arc::new(InMemoryStore::seeded());
        let defaults = PageMetadata {
            title: "Corner Shop".into(),
            ..PageMetadata::site_default()
        };
        let state = AppState::new(store.clone(), TemplateSource::inline(TEMPLATE))
            .with_resolver(MetadataResolver::new(store, defaults))
            .with_assets(StaticAssets::new(dir.path()));
        let app = router(state);

        let html = body_text(get(app.clone(), "/about").await).await;
        assert!(html.contains("<title>Corner Shop</title>"));

        let response = get(app, "/robots.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "User-agent: *");
    }

    #[tokio::test]
    async fn health_check() {
        let response = get(app(), "/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }
}
