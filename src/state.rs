// src/state.rs

use std::sync::Arc;

use crate::cart_store::CartStore;
use crate::catalog::{ProductSource, RemoteCatalog, StaticCatalog};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::CatalogSourceKind;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn ProductSource>,
    pub carts: CartStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Składa stan aplikacji, wybierając źródło katalogu z konfiguracji.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let catalog: Arc<dyn ProductSource> = match config.catalog_source {
            CatalogSourceKind::Static => Arc::new(StaticCatalog::sample()?),
            CatalogSourceKind::Remote => {
                let base_url = config.products_api_url.clone().ok_or_else(|| {
                    AppError::Config("Brak PRODUCTS_API_URL dla katalogu zdalnego".to_string())
                })?;
                Arc::new(RemoteCatalog::new(
                    base_url,
                    config.remote_timeout,
                    config.catalog_cache_ttl,
                )?)
            }
        };

        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: AppConfig, catalog: Arc<dyn ProductSource>) -> Self {
        AppState {
            catalog,
            carts: CartStore::new(config.cart_ttl),
            config: Arc::new(config),
        }
    }
}
