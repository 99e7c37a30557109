// src/htmx_handlers.rs

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Html,
};
use axum_extra::extract::cookie::CookieJar;
use maud::Markup;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    cart::CartOutcome,
    errors::AppError,
    extractor::{OptionalVisitor, visitor_cookie, visitor_id},
    models::{CartSummary, ChangeQtyParams, SessionParams},
    render,
    response::{AppResponse, PageParts, build_response, insert_hx_trigger, serve_full_page},
    state::AppState,
};

/// Zwraca UUID odwiedzającego; nowym odwiedzającym ustawia ciasteczko.
fn ensure_visitor(jar: CookieJar) -> (CookieJar, Uuid) {
    if let Some(id) = visitor_id(&jar) {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    tracing::debug!("Nowy odwiedzający: {}", id);
    (jar.add(visitor_cookie(id)), id)
}

/// Ładuje katalog sesji i renderuje karty albo komunikat o błędzie.
async fn load_products_markup(app_state: &AppState, session: Option<&str>) -> Markup {
    match app_state.catalog.load_products(session).await {
        Ok(products) => {
            tracing::info!(
                "Załadowano {} produktów dla sesji {:?}",
                products.len(),
                session
            );
            render::product_grid(&products, session)
        }
        Err(err) => {
            tracing::warn!(
                "Nie udało się załadować katalogu dla sesji {:?}: {}",
                session,
                err
            );
            let verification_url = session.and_then(|s| app_state.catalog.verification_url(s));
            render::catalog_message(&err, session, verification_url.as_deref())
        }
    }
}

async fn current_summary(app_state: &AppState, visitor: Option<Uuid>) -> CartSummary {
    let Some(visitor) = visitor else {
        return CartSummary::default();
    };
    let Some(shared) = app_state.carts.existing(visitor).await else {
        return CartSummary::default();
    };
    let summary = shared.lock().await.summary();
    summary
}

fn cart_count_event(summary: &CartSummary) -> Value {
    json!({
        "newCount": summary.line_count,
        "newCartTotalPrice": summary.total_price,
        "newCartTotalPriceFormatted": render::format_amount(summary.total_price),
    })
}

fn message_event(kind: &str, message: &str) -> Value {
    json!({ "type": kind, "message": message })
}

/// Pełna strona Mini App: katalog sesji plus bieżący koszyk.
pub async fn index_handler(
    State(app_state): State<AppState>,
    Query(params): Query<SessionParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let session = params.session();
    tracing::info!("MAUD: / - strona główna, sesja: {:?}", session);

    let (jar, visitor) = ensure_visitor(jar);
    let products = load_products_markup(&app_state, session).await;

    let summary = app_state
        .carts
        .cart_for_page(visitor, session)
        .await
        .lock()
        .await
        .summary();

    let page = serve_full_page(PageParts {
        products,
        cart: render::cart_lines(&summary),
        total_price: summary.total_price,
        cart_count: summary.line_count,
    })?;
    Ok((jar, page))
}

/// Lista produktów; dla HTMX sam fragment, dla zwykłego żądania pełna strona.
pub async fn list_products_htmx_handler(
    State(app_state): State<AppState>,
    Query(params): Query<SessionParams>,
    headers: HeaderMap,
    OptionalVisitor(visitor): OptionalVisitor,
) -> Result<AppResponse, AppError> {
    let session = params.session();
    tracing::info!("MAUD: /htmx/products - sesja: {:?}", session);

    let products = load_products_markup(&app_state, session).await;
    let summary = current_summary(&app_state, visitor).await;

    build_response(
        &headers,
        PageParts {
            products,
            cart: render::cart_lines(&summary),
            total_price: summary.total_price,
            cart_count: summary.line_count,
        },
    )
}

pub async fn add_item_to_cart_htmx_handler(
    State(app_state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(params): Query<SessionParams>,
    jar: CookieJar,
) -> Result<(CookieJar, HeaderMap, Markup), AppError> {
    let session = params.session();
    tracing::info!(
        "MAUD HTMX: /htmx/cart/add/{} - próba dodania produktu (sesja: {:?})",
        product_id,
        session
    );

    let (jar, visitor) = ensure_visitor(jar);
    let mut headers = HeaderMap::new();

    let catalog = match app_state.catalog.load_products(session).await {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!("MAUD AddToCart: Katalog niedostępny: {}", err);
            let summary = current_summary(&app_state, Some(visitor)).await;
            insert_hx_trigger(
                &mut headers,
                &json!({
                    "updateCartCount": cart_count_event(&summary),
                    "showMessage": message_event("error", "Каталог недоступен, попробуйте позже."),
                }),
            );
            return Ok((jar, headers, render::cart_lines(&summary)));
        }
    };

    let shared = app_state.carts.cart_for(visitor, session).await;
    let (outcome, summary, foreign_session) = {
        let mut cart = shared.lock().await;
        // Koszyk należy do innej sesji Mini App: nie mieszamy katalogów
        if cart.session() != session {
            (CartOutcome::Unchanged, cart.summary(), true)
        } else {
            let outcome = cart.add_to_cart(&catalog, product_id);
            (outcome, cart.summary(), false)
        }
    };

    let trigger_payload = if foreign_session {
        tracing::warn!(
            "MAUD AddToCart: Koszyk {} należy do innej sesji niż {:?}. Pomijam produkt {}.",
            visitor,
            session,
            product_id
        );
        json!({
            "updateCartCount": cart_count_event(&summary),
            "showMessage": message_event(
                "warning",
                "Корзина открыта в другой сессии. Откройте каталог заново через бота.",
            ),
        })
    } else if outcome == CartOutcome::Unchanged {
        tracing::warn!(
            "MAUD AddToCart: Produkt o ID {} nie znaleziony w katalogu.",
            product_id
        );
        json!({
            "updateCartCount": cart_count_event(&summary),
            "showMessage": message_event("warning", "Товар не найден."),
        })
    } else {
        tracing::info!(
            "MAUD AddToCart: Produkt ID {} w koszyku {} ({:?}), suma: {}",
            product_id,
            visitor,
            outcome,
            summary.total_price
        );
        json!({ "updateCartCount": cart_count_event(&summary) })
    };
    insert_hx_trigger(&mut headers, &trigger_payload);

    Ok((jar, headers, render::cart_lines(&summary)))
}

pub async fn change_qty_htmx_handler(
    State(app_state): State<AppState>,
    Path(product_id): Path<i64>,
    Query(params): Query<ChangeQtyParams>,
    OptionalVisitor(visitor): OptionalVisitor,
) -> Result<(HeaderMap, Markup), AppError> {
    tracing::info!(
        "MAUD HTMX: /htmx/cart/change/{} - zmiana ilości o {}",
        product_id,
        params.delta
    );

    let mut headers = HeaderMap::new();
    let shared = match visitor {
        Some(visitor) => app_state.carts.existing(visitor).await,
        None => None,
    };

    let (outcome, summary) = match shared {
        Some(shared) => {
            let mut cart = shared.lock().await;
            let outcome = cart.change_qty(product_id, params.delta);
            (outcome, cart.summary())
        }
        None => (CartOutcome::Unchanged, CartSummary::default()),
    };

    let trigger_payload = if outcome == CartOutcome::Unchanged {
        tracing::warn!(
            "MAUD ChangeQty: Produkt ID {} nie znaleziony w koszyku.",
            product_id
        );
        json!({
            "updateCartCount": cart_count_event(&summary),
            "showMessage": message_event("warning", "Этого товара уже нет в корзине."),
        })
    } else {
        json!({ "updateCartCount": cart_count_event(&summary) })
    };
    insert_hx_trigger(&mut headers, &trigger_payload);

    Ok((headers, render::cart_lines(&summary)))
}

pub async fn get_cart_details_htmx_handler(
    State(app_state): State<AppState>,
    OptionalVisitor(visitor): OptionalVisitor,
) -> Result<(HeaderMap, Markup), AppError> {
    tracing::info!("MAUD: /htmx/cart - żądanie zawartości koszyka");

    let summary = current_summary(&app_state, visitor).await;
    let mut headers = HeaderMap::new();
    insert_hx_trigger(
        &mut headers,
        &json!({ "updateCartCount": cart_count_event(&summary) }),
    );
    Ok((headers, render::cart_lines(&summary)))
}

/// Składa zamówienie i przekazuje je stronie zdarzeniem `sendOrder`; strona
/// wywołuje `Telegram.WebApp.sendData`. Koszyk nie jest czyszczony.
pub async fn checkout_htmx_handler(
    State(app_state): State<AppState>,
    OptionalVisitor(visitor): OptionalVisitor,
) -> Result<(HeaderMap, StatusCode), AppError> {
    tracing::info!("MAUD HTMX: /htmx/checkout - składanie zamówienia");

    let mut headers = HeaderMap::new();
    let shared = match visitor {
        Some(visitor) => app_state.carts.existing(visitor).await,
        None => None,
    };

    let payload = match shared {
        Some(shared) => {
            let cart = shared.lock().await;
            let payload = (!cart.is_empty()).then(|| cart.order_payload());
            payload
        }
        None => None,
    };

    match payload {
        Some(payload) => {
            tracing::info!(
                "MAUD Checkout: zamówienie na kwotę {} ({} znaków opisu)",
                payload.total,
                payload.order.chars().count()
            );
            insert_hx_trigger(&mut headers, &json!({ "sendOrder": payload }));
        }
        None => {
            tracing::warn!("MAUD Checkout: próba złożenia zamówienia z pustym koszykiem.");
            insert_hx_trigger(
                &mut headers,
                &json!({ "showMessage": message_event("warning", "Корзина пуста.") }),
            );
        }
    }

    Ok((headers, StatusCode::OK))
}
