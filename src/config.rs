use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use dotenvy::Error as DotenvError;
use thiserror::Error;

use crate::metadata::PageMetadata;

const DEFAULT_PORT: u16 = 3002;
const DEFAULT_STATIC_DIR: &str = "public";
const TEMPLATE_FILE: &str = "index.html";

const PORT_ENV: &str = "PORT";
const ADDR_ENV: &str = "OGSERVE_ADDR";
const STATIC_DIR_ENV: &str = "OGSERVE_STATIC_DIR";
const TEMPLATE_ENV: &str = "OGSERVE_TEMPLATE";
const TEMPLATE_RELOAD_ENV: &str = "OGSERVE_TEMPLATE_RELOAD";
const PUBLIC_ORIGIN_ENV: &str = "OGSERVE_PUBLIC_ORIGIN";
const TITLE_NONCE_ENV: &str = "OGSERVE_TITLE_NONCE";
const CONTENT_ENV: &str = "OGSERVE_CONTENT";
const SITE_TITLE_ENV: &str = "OGSERVE_SITE_TITLE";
const SITE_DESCRIPTION_ENV: &str = "OGSERVE_SITE_DESCRIPTION";
const SITE_IMAGE_ENV: &str = "OGSERVE_SITE_IMAGE";

/// Configuration consumed before the router is assembled.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding the built front-end bundle.
    pub static_dir: PathBuf,
    pub template_path: PathBuf,
    /// Re-read the template on every request instead of caching it.
    pub template_reload: bool,
    /// Origin used for `og:url`; derived from request headers when unset.
    pub public_origin: Option<String>,
    /// Appends a random number to every page title. Debugging aid only.
    pub title_nonce: bool,
    /// JSON content file replacing the built-in demo records.
    pub content_path: Option<PathBuf>,
    pub defaults: PageMetadata,
}

impl ServerConfig {
    /// Loads configuration from `PORT` and the `OGSERVE_*` environment variables.
    ///
    /// Values from a local `.env` file (parsed via [`dotenvy::dotenv_override`]) override whatever is already set in
    /// the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_overrides()?;

        let port = match var(PORT_ENV) {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let addr = match var(ADDR_ENV) {
            Some(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidAddr(value))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let mut builder = Self::builder()
            .bind_addr(SocketAddr::new(addr, port))
            .template_reload(flag(TEMPLATE_RELOAD_ENV)?)
            .title_nonce(flag(TITLE_NONCE_ENV)?);

        if let Some(dir) = var(STATIC_DIR_ENV) {
            builder = builder.static_dir(dir);
        }
        if let Some(path) = var(TEMPLATE_ENV) {
            builder = builder.template_path(path);
        }
        if let Some(origin) = var(PUBLIC_ORIGIN_ENV) {
            builder = builder.public_origin(origin);
        }
        if let Some(path) = var(CONTENT_ENV) {
            builder = builder.content_path(path);
        }

        let mut defaults = PageMetadata::site_default();
        if let Some(title) = var(SITE_TITLE_ENV) {
            defaults.title = title;
        }
        if let Some(description) = var(SITE_DESCRIPTION_ENV) {
            defaults.description = description;
        }
        if let Some(image) = var(SITE_IMAGE_ENV) {
            defaults.image = image;
        }

        Ok(builder.defaults(defaults).build())
    }

    /// Returns a builder for programmatic overrides.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

impl Default for ServerConfig {
    /// Binds to `0.0.0.0:3002` and serves `public/`.
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder type for [`ServerConfig`].
#[derive(Default, Clone, Debug)]
pub struct ServerConfigBuilder {
    bind_addr: Option<SocketAddr>,
    static_dir: Option<PathBuf>,
    template_path: Option<PathBuf>,
    template_reload: bool,
    public_origin: Option<String>,
    title_nonce: bool,
    content_path: Option<PathBuf>,
    defaults: Option<PageMetadata>,
}

impl ServerConfigBuilder {
    /// Sets the listener address.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Sets the static bundle directory. The template defaults to its `index.html`.
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn template_reload(mut self, enabled: bool) -> Self {
        self.template_reload = enabled;
        self
    }

    /// Sets the origin (scheme and host) canonical URLs are built from.
    pub fn public_origin(mut self, origin: impl Into<String>) -> Self {
        self.public_origin = Some(origin.into());
        self
    }

    pub fn title_nonce(mut self, enabled: bool) -> Self {
        self.title_nonce = enabled;
        self
    }

    pub fn content_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.content_path = Some(path.into());
        self
    }

    /// Sets the site-wide fallback metadata.
    pub fn defaults(mut self, defaults: PageMetadata) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> ServerConfig {
        let static_dir = self
            .static_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));
        let template_path = self
            .template_path
            .unwrap_or_else(|| static_dir.join(TEMPLATE_FILE));
        let public_origin = self
            .public_origin
            .map(|origin| origin.trim_end_matches('/').to_owned());

        ServerConfig {
            bind_addr: self.bind_addr.unwrap_or_else(|| {
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT)
            }),
            static_dir,
            template_path,
            template_reload: self.template_reload,
            public_origin,
            title_nonce: self.title_nonce,
            content_path: self.content_path,
            defaults: self.defaults.unwrap_or_else(PageMetadata::site_default),
        }
    }
}

/// Errors that can occur while building [`ServerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid listen address: {0}")]
    InvalidAddr(String),
    #[error("invalid value for {name}: {value} (expected true/false)")]
    InvalidFlag { name: &'static str, value: String },
    #[error("failed to load .env overrides: {0}")]
    Dotenv(#[from] DotenvError),
}

fn load_env_overrides() -> Result<(), ConfigError> {
    match dotenvy::dotenv_override() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err)),
    }
}

/// Reads a variable, treating empty values as unset.
fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn flag(name: &'static str) -> Result<bool, ConfigError> {
    let Some(value) = var(name) else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    const ALL_VARS: &[&str] = &[
        PORT_ENV,
        ADDR_ENV,
        STATIC_DIR_ENV,
        TEMPLATE_ENV,
        TEMPLATE_RELOAD_ENV,
        PUBLIC_ORIGIN_ENV,
        TITLE_NONCE_ENV,
        CONTENT_ENV,
        SITE_TITLE_ENV,
        SITE_DESCRIPTION_ENV,
        SITE_IMAGE_ENV,
    ];

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_env() {
        for name in ALL_VARS {
            unsafe {
                std::env::remove_var(name);
            }
        }
    }

    #[test]
    fn defaults_match_demo_layout() {
        let config = ServerConfig::default();
        assert_eq!(
            config.bind_addr,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3002)
        );
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.template_path, PathBuf::from("public/index.html"));
        assert!(!config.title_nonce);
        assert!(!config.template_reload);
        assert!(config.public_origin.is_none());
        assert_eq!(config.defaults, PageMetadata::site_default());
    }

    #[test]
    fn builder_overrides_defaults() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 8)), 9999);
        let config = ServerConfig::builder()
            .bind_addr(addr)
            .static_dir("dist")
            .public_origin("https://example.com/")
            .title_nonce(true)
            .build();

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.template_path, PathBuf::from("dist/index.html"));
        assert_eq!(config.public_origin.as_deref(), Some("https://example.com"));
        assert!(config.title_nonce);
    }

    #[test]
    fn reads_env_configuration() {
        let _guard = env_lock().lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var(PORT_ENV, "9000");
            std::env::set_var(ADDR_ENV, "127.0.0.2");
            std::env::set_var(STATIC_DIR_ENV, "build");
            std::env::set_var(TEMPLATE_RELOAD_ENV, "yes");
            std::env::set_var(PUBLIC_ORIGIN_ENV, "https://shop.example");
            std::env::set_var(SITE_TITLE_ENV, "My Shop");
        }

        let config = ServerConfig::from_env().expect("config");
        assert_eq!(
            config.bind_addr,
            SocketAddr::new("127.0.0.2".parse().unwrap(), 9000)
        );
        assert_eq!(config.template_path, PathBuf::from("build/index.html"));
        assert!(config.template_reload);
        assert!(!config.title_nonce);
        assert_eq!(config.public_origin.as_deref(), Some("https://shop.example"));
        assert_eq!(config.defaults.title, "My Shop");
        assert_eq!(
            config.defaults.description,
            PageMetadata::site_default().description
        );

        clear_env();
    }

    #[test]
    fn rejects_invalid_values() {
        let _guard = env_lock().lock().unwrap();
        clear_env();

        unsafe {
            std::env::set_var(PORT_ENV, "not-a-port");
        }
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::InvalidPort(value)) if value == "not-a-port"
        ));

        clear_env();
        unsafe {
            std::env::set_var(TITLE_NONCE_ENV, "maybe");
        }
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::InvalidFlag { name: TITLE_NONCE_ENV, .. })
        ));

        clear_env();
    }
}
