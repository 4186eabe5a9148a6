use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.cal.social";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://cal.social";
pub const DEFAULT_APP_SCHEME: &str = "calsocial";
pub const DEFAULT_APP_STORE_URL: &str = "https://apps.apple.com/app/calsocial/id6738835548";
pub const DEFAULT_PLAY_STORE_URL: &str =
    "https://play.google.com/store/apps/details?id=social.cal.calsocial";
pub const DEFAULT_IMAGE_URL: &str = "https://cal.social/assets/smallLogo.png";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },

    #[error("{var} must be an http(s) URL, got {value}")]
    UnsupportedScheme { var: &'static str, value: String },

    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Base of the preview API, without trailing slash.
    pub api_base_url: String,
    /// Public origin the share links live on, without trailing slash.
    pub public_base_url: String,
    pub app_scheme: String,
    pub app_store_url: String,
    pub play_store_url: String,
    pub default_image_url: String,
    pub site_name: String,
    pub fetch_timeout: Duration,
    /// `max-age` sent on rendered share pages, in seconds.
    pub cache_max_age: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            app_scheme: DEFAULT_APP_SCHEME.to_string(),
            app_store_url: DEFAULT_APP_STORE_URL.to_string(),
            play_store_url: DEFAULT_PLAY_STORE_URL.to_string(),
            default_image_url: DEFAULT_IMAGE_URL.to_string(),
            site_name: "calsocial".to_string(),
            fetch_timeout: Duration::from_millis(5000),
            cache_max_age: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            api_base_url: url_var("PREVIEW_API_BASE_URL", DEFAULT_API_BASE_URL)?,
            public_base_url: url_var("PUBLIC_BASE_URL", DEFAULT_PUBLIC_BASE_URL)?,
            app_scheme: env::var("APP_URL_SCHEME")
                .map(|s| s.trim_end_matches("://").to_string())
                .unwrap_or(defaults.app_scheme),
            app_store_url: url_var("APP_STORE_URL", DEFAULT_APP_STORE_URL)?,
            play_store_url: url_var("PLAY_STORE_URL", DEFAULT_PLAY_STORE_URL)?,
            default_image_url: url_var("DEFAULT_IMAGE_URL", DEFAULT_IMAGE_URL)?,
            site_name: env::var("SITE_NAME").unwrap_or(defaults.site_name),
            fetch_timeout: Duration::from_millis(number_var("PREVIEW_FETCH_TIMEOUT_MS", 5000)?),
            cache_max_age: number_var("PAGE_CACHE_MAX_AGE", 120)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Read an http(s) URL from the environment, stripping any trailing slash.
fn url_var(var: &'static str, default: &str) -> Result<String, ConfigError> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    let parsed = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { var, source })?;

    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        _ => Err(ConfigError::UnsupportedScheme { var, value: raw }),
    }
}

fn number_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        Err(_) => Ok(default),
    }
}
