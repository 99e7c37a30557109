// src/handlers.rs

use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::{
    errors::AppError,
    extractor::OptionalVisitor,
    models::{CartSummary, Product, SessionParams},
    state::AppState,
};

pub async fn healthz() -> &'static str {
    "ok"
}

/// JSON z bieżącym stanem koszyka odwiedzającego.
pub async fn get_cart_handler(
    State(app_state): State<AppState>,
    OptionalVisitor(visitor): OptionalVisitor,
) -> Result<Json<CartSummary>, AppError> {
    let Some(visitor) = visitor else {
        tracing::debug!("API: /api/cart bez ciasteczka, pusty koszyk");
        return Ok(Json(CartSummary::default()));
    };

    let summary = match app_state.carts.existing(visitor).await {
        Some(shared) => {
            let cart = shared.lock().await;
            cart.summary()
        }
        None => CartSummary::default(),
    };
    tracing::info!(
        "API: /api/cart dla {}: {} pozycji, suma {}",
        visitor,
        summary.line_count,
        summary.total_price
    );
    Ok(Json(summary))
}

/// JSON z katalogiem sesji; błędy katalogu mapowane przez `AppError`.
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = app_state.catalog.load_products(params.session()).await?;
    Ok(Json(products.as_ref().clone()))
}
