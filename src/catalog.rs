// src/catalog.rs

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use url::Url;
use validator::Validate;

use crate::errors::CatalogError;
use crate::models::Product;

const SAMPLE_PRODUCTS_JSON: &str = include_str!("../data/sample_products.json");
const MAX_ERROR_BODY_CHARS: usize = 300;
const CATALOG_CACHE_CAPACITY: u64 = 10_000;

/// Źródło listy produktów dla strony Mini App.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Zwraca niepusty katalog dla danej sesji.
    async fn load_products(
        &self,
        session: Option<&str>,
    ) -> Result<Arc<Vec<Product>>, CatalogError>;

    /// Adres, pod którym użytkownik może ręcznie sprawdzić dane sesji.
    fn verification_url(&self, _session: &str) -> Option<String> {
        None
    }
}

/// Wbudowany katalog; ignoruje identyfikator sesji.
pub struct StaticCatalog {
    products: Arc<Vec<Product>>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        StaticCatalog {
            products: Arc::new(products),
        }
    }

    pub fn sample() -> Result<Self, CatalogError> {
        parse_products(SAMPLE_PRODUCTS_JSON.as_bytes()).map(Self::new)
    }
}

#[async_trait]
impl ProductSource for StaticCatalog {
    async fn load_products(
        &self,
        _session: Option<&str>,
    ) -> Result<Arc<Vec<Product>>, CatalogError> {
        if self.products.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Arc::clone(&self.products))
    }
}

/// Katalog pobierany z `GET {base}/api/products?session=<id>`.
///
/// Poprawnie pobrane katalogi trafiają do cache'u na czas `cache_ttl`,
/// ponieważ zestaw produktów sesji nie zmienia się po załadowaniu. Błędy nie
/// są cache'owane, więc ręczne ponowienie zawsze idzie do serwera.
pub struct RemoteCatalog {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, Arc<Vec<Product>>>,
}

impl RemoteCatalog {
    pub fn new(base_url: Url, timeout: Duration, cache_ttl: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let cache = Cache::builder()
            .max_capacity(CATALOG_CACHE_CAPACITY)
            .time_to_live(cache_ttl)
            .build();

        Ok(RemoteCatalog {
            client,
            base_url,
            cache,
        })
    }

    pub fn products_url(&self, session: &str) -> Result<Url, CatalogError> {
        let mut url = self
            .base_url
            .join("api/products")
            .map_err(|e| CatalogError::Malformed(format!("Nieprawidłowy adres API: {}", e)))?;
        url.query_pairs_mut().append_pair("session", session);
        Ok(url)
    }

    async fn fetch(&self, session: &str) -> Result<Vec<Product>, CatalogError> {
        let url = self.products_url(session)?;
        tracing::info!("Pobieranie katalogu: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Serwer katalogu zwrócił {} dla sesji {}", status, session);
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let bytes = response.bytes().await?;
        parse_products(&bytes)
    }
}

#[async_trait]
impl ProductSource for RemoteCatalog {
    async fn load_products(
        &self,
        session: Option<&str>,
    ) -> Result<Arc<Vec<Product>>, CatalogError> {
        let session = session.ok_or(CatalogError::MissingSession)?;

        if let Some(cached) = self.cache.get(session).await {
            tracing::debug!("Cache HIT dla katalogu sesji: {}", session);
            return Ok(cached);
        }
        tracing::debug!("Cache MISS dla katalogu sesji: {}. Pobieranie.", session);

        let products = Arc::new(self.fetch(session).await?);
        self.cache
            .insert(session.to_string(), Arc::clone(&products))
            .await;
        Ok(products)
    }

    fn verification_url(&self, session: &str) -> Option<String> {
        self.products_url(session).ok().map(|url| url.to_string())
    }
}

/// Parsuje i waliduje listę produktów. Akceptowana jest wyłącznie niepusta
/// tablica z unikalnymi ID.
pub fn parse_products(bytes: &[u8]) -> Result<Vec<Product>, CatalogError> {
    let products: Vec<Product> =
        serde_json::from_slice(bytes).map_err(|e| CatalogError::Malformed(e.to_string()))?;

    if products.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen = HashSet::with_capacity(products.len());
    for product in &products {
        product
            .validate()
            .map_err(|e| CatalogError::Malformed(format!("Produkt {}: {}", product.id, e)))?;
        if !seen.insert(product.id) {
            return Err(CatalogError::Malformed(format!(
                "Zduplikowane ID produktu: {}",
                product.id
            )));
        }
    }

    Ok(products)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
