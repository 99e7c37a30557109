// src/main.rs

use axum::{
    Router,
    routing::{get, post},
};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Deklaracje modułów
mod cart; // dla src/cart.rs
mod cart_store; // dla src/cart_store.rs
mod catalog; // dla src/catalog.rs
mod config; // dla src/config.rs
mod errors; // dla src/errors.rs
mod extractor; // dla src/extractor.rs
mod handlers; // dla src/handlers.rs
mod htmx_handlers;
mod models; // dla src/models.rs
mod render; // dla src/render.rs
mod response; // dla src/response.rs
mod state; // dla src/state.rs

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod router_tests;

use crate::config::AppConfig;
use crate::handlers::*;
use crate::htmx_handlers::*;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "miniapp_cart_backend=debug,tower_http=debug".into()), // np. RUST_LOG=info cargo run
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Inicjalizacja serwera...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Nieprawidłowa konfiguracja: {}", err);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Źródło katalogu: {}, adres API: {:?}",
        config.catalog_source,
        config.products_api_url.as_ref().map(|url| url.as_str())
    );

    let addr = config.bind_addr;
    let app_state = match AppState::from_config(config) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Nie można zainicjalizować stanu aplikacji: {}", err);
            std::process::exit(1);
        }
    };

    let app = build_router(app_state).layer(TraceLayer::new_for_http());

    tracing::info!("Serwer nasłuchuje na {}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Nie można powiązać adresu {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Błąd serwera: {}", e);
    }
}

/// Definicja routingu aplikacji
pub fn build_router(app_state: AppState) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(healthz))
        .route("/api/cart", get(get_cart_handler))
        .route("/api/catalog", get(list_products))
        .route("/htmx/products", get(list_products_htmx_handler))
        .route("/htmx/cart", get(get_cart_details_htmx_handler))
        .route(
            "/htmx/cart/add/{product_id}",
            post(add_item_to_cart_htmx_handler),
        )
        .route(
            "/htmx/cart/change/{product_id}",
            post(change_qty_htmx_handler),
        )
        .route("/htmx/checkout", post(checkout_htmx_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(app_state)
}
