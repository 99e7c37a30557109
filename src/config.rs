// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::AppError;
use crate::models::CatalogSourceKind;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CART_TTL_MINUTES: u64 = 30;
const DEFAULT_CATALOG_CACHE_TTL_MINUTES: u64 = 30;
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub catalog_source: CatalogSourceKind,
    /// Wymagany tylko dla `CatalogSourceKind::Remote`
    pub products_api_url: Option<Url>,
    pub remote_timeout: Duration,
    pub cart_ttl: Duration,
    pub catalog_cache_ttl: Duration,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Buduje konfigurację z dowolnego źródła zmiennych (ułatwia testy).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = SocketAddr::from_str(&bind_addr)
            .map_err(|e| AppError::Config(format!("BIND_ADDR '{}': {}", bind_addr, e)))?;

        let catalog_source = match lookup("CATALOG_SOURCE") {
            Some(raw) => CatalogSourceKind::from_str(raw.trim()).map_err(|_| {
                AppError::Config(format!(
                    "CATALOG_SOURCE musi być 'static' albo 'remote', otrzymano '{}'",
                    raw
                ))
            })?,
            None => CatalogSourceKind::Static,
        };

        let products_api_url = match lookup("PRODUCTS_API_URL") {
            Some(raw) => Some(parse_api_base(&raw)?),
            None => None,
        };

        if catalog_source == CatalogSourceKind::Remote && products_api_url.is_none() {
            return Err(AppError::Config(
                "PRODUCTS_API_URL must be set when CATALOG_SOURCE=remote".to_string(),
            ));
        }

        Ok(AppConfig {
            bind_addr,
            catalog_source,
            products_api_url,
            remote_timeout: Duration::from_secs(parse_number(
                &lookup,
                "REMOTE_TIMEOUT_SECS",
                DEFAULT_REMOTE_TIMEOUT_SECS,
            )?),
            cart_ttl: Duration::from_secs(
                60 * parse_number(&lookup, "CART_TTL_MINUTES", DEFAULT_CART_TTL_MINUTES)?,
            ),
            catalog_cache_ttl: Duration::from_secs(
                60 * parse_number(
                    &lookup,
                    "CATALOG_CACHE_TTL_MINUTES",
                    DEFAULT_CATALOG_CACHE_TTL_MINUTES,
                )?,
            ),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
        })
    }
}

/// Adres bazowy API zawsze kończy się `/`, inaczej `join("api/products")`
/// zastąpiłby ostatni segment ścieżki.
fn parse_api_base(raw: &str) -> Result<Url, AppError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| AppError::Config(format!("PRODUCTS_API_URL '{}': {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_number<F>(lookup: &F, key: &str, default: u64) -> Result<u64, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::Config(format!("{} must be a valid number", key))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_static_catalog() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.catalog_source, CatalogSourceKind::Static);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.cart_ttl, Duration::from_secs(30 * 60));
        assert!(config.products_api_url.is_none());
    }

    #[test]
    fn remote_catalog_requires_api_url() {
        let result = AppConfig::from_lookup(lookup_from(&[("CATALOG_SOURCE", "remote")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn remote_catalog_with_url_is_accepted() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CATALOG_SOURCE", "remote"),
            ("PRODUCTS_API_URL", "https://shop.example.com"),
            ("REMOTE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.catalog_source, CatalogSourceKind::Remote);
        assert_eq!(config.remote_timeout, Duration::from_secs(5));
        assert_eq!(
            config.products_api_url.unwrap().host_str(),
            Some("shop.example.com")
        );
    }

    #[test]
    fn api_url_path_gets_trailing_slash() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CATALOG_SOURCE", "remote"),
            ("PRODUCTS_API_URL", "https://shop.example.com/shop"),
        ]))
        .unwrap();
        let base = config.products_api_url.unwrap();
        assert_eq!(base.as_str(), "https://shop.example.com/shop/");
        assert_eq!(
            base.join("api/products").unwrap().path(),
            "/shop/api/products"
        );

        let config = AppConfig::from_lookup(lookup_from(&[(
            "PRODUCTS_API_URL",
            "https://shop.example.com/shop/",
        )]))
        .unwrap();
        assert_eq!(
            config.products_api_url.unwrap().as_str(),
            "https://shop.example.com/shop/"
        );
    }

    #[test]
    fn invalid_number_is_a_config_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("CART_TTL_MINUTES", "pół godziny")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
