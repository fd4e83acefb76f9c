//! Cart store configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rocket_cache::cache_key;
use rocket_data::{DependencyTag, FetchPolicy, RetryPolicy, TimeoutConfig};
use serde::{Deserialize, Serialize};

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "ROCKET_CART_API_URL";
/// Overrides `storage.dir`.
pub const ENV_STORAGE_DIR: &str = "ROCKET_CART_STORAGE_DIR";

/// Cart store configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storefront API.
    #[serde(default)]
    pub api: ApiConfig,

    /// Durable cart storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

impl CartConfig {
    /// Load config from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are
    /// ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = var(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(dir) = var(ENV_STORAGE_DIR) {
            self.storage.dir = PathBuf::from(dir);
        }
        self
    }
}

/// Storefront API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the stock and product endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Stock lookup deadline in milliseconds.
    #[serde(default = "default_stock_timeout_ms")]
    pub stock_timeout_ms: u64,

    /// Product lookup deadline in milliseconds.
    #[serde(default = "default_products_timeout_ms")]
    pub products_timeout_ms: u64,

    /// Connection setup deadline in milliseconds, shared by both lookups.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Extra attempts after a transient failure. Zero disables retries.
    #[serde(default)]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_stock_timeout_ms() -> u64 {
    2_000
}

fn default_products_timeout_ms() -> u64 {
    5_000
}

fn default_connect_timeout_ms() -> u64 {
    500
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stock_timeout_ms: default_stock_timeout_ms(),
            products_timeout_ms: default_products_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_retries: 0,
        }
    }
}

impl ApiConfig {
    /// Connection setup deadline for the HTTP client.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Fetch policy for one of the cart's dependencies.
    pub fn policy_for(&self, tag: DependencyTag) -> FetchPolicy {
        let total = match tag {
            DependencyTag::Inventory => Duration::from_millis(self.stock_timeout_ms),
            DependencyTag::Catalog => Duration::from_millis(self.products_timeout_ms),
            DependencyTag::Custom(_) => tag.default_timeout(),
        };
        let retry = if self.max_retries == 0 {
            RetryPolicy::none()
        } else {
            RetryPolicy::new(self.max_retries)
        };
        FetchPolicy::new(TimeoutConfig::from_total(total), retry)
    }
}

/// Where the cart is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on exit.
    Memory,
    /// One JSON file per key under `storage.dir`.
    #[default]
    File,
    /// The Spin key-value store (wasm32 only).
    Spin,
}

/// Durable cart storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key namespace.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Key of the cart within the namespace.
    #[serde(default = "default_key")]
    pub key: String,

    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

fn default_namespace() -> String {
    "@RocketShoes".to_string()
}

fn default_key() -> String {
    "cart".to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".rocket-cart")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            key: default_key(),
            backend: StorageBackend::default(),
            dir: default_dir(),
        }
    }
}

impl StorageConfig {
    /// Full key the cart is stored under, e.g. `@RocketShoes:cart`.
    pub fn storage_key(&self) -> String {
        if self.namespace.is_empty() {
            self.key.clone()
        } else {
            cache_key!(self.namespace.as_str(), self.key)
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Human,
}

/// Logging settings. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:3333");
        assert_eq!(config.api.max_retries, 0);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.storage_key(), "@RocketShoes:cart");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_load_toml_with_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://api.rocketshoes.dev"
stock_timeout_ms = 750

[storage]
backend = "memory"
"#
        )
        .unwrap();

        let config = CartConfig::load(file.path()).unwrap();

        assert_eq!(config.api.base_url, "https://api.rocketshoes.dev");
        assert_eq!(config.api.stock_timeout_ms, 750);
        assert_eq!(config.api.products_timeout_ms, 5_000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.key, "cart");
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_load_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"log": {{"level": "debug", "format": "human"}}}}"#).unwrap();

        let config = CartConfig::load(file.path()).unwrap();

        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Human);
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_load_reports_path() {
        let err = CartConfig::load("/nonexistent/rocket-cart.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rocket-cart.toml"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, "http://stage:3333"),
            (ENV_STORAGE_DIR, "  "),
        ]
        .into_iter()
        .collect();

        let config = CartConfig::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://stage:3333");
        assert_eq!(config.storage.dir, default_dir());
    }

    #[test]
    fn test_policy_for() {
        let api = ApiConfig {
            stock_timeout_ms: 100,
            max_retries: 2,
            ..ApiConfig::default()
        };

        let stock = api.policy_for(DependencyTag::Inventory);
        assert_eq!(stock.timeout.total, Duration::from_millis(100));
        assert_eq!(stock.retry.max_retries, 2);

        let products = ApiConfig::default().policy_for(DependencyTag::Catalog);
        assert_eq!(products.timeout.total, Duration::from_secs(5));
        assert_eq!(products.retry, RetryPolicy::none());
    }

    #[test]
    fn test_connect_timeout() {
        assert_eq!(ApiConfig::default().connect_timeout(), Duration::from_millis(500));

        let config: CartConfig = toml::from_str("[api]\nconnect_timeout_ms = 150\n").unwrap();
        assert_eq!(config.api.connect_timeout(), Duration::from_millis(150));
        assert_eq!(config.api.stock_timeout_ms, 2_000);
    }

    #[test]
    fn test_storage_key_without_namespace() {
        let storage = StorageConfig {
            namespace: String::new(),
            ..StorageConfig::default()
        };
        assert_eq!(storage.storage_key(), "cart");
    }
}
