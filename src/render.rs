// src/render.rs

use maud::{Markup, html};

use crate::errors::CatalogError;
use crate::models::{CartSummary, Product};

/// Formatuje kwotę jak `toLocaleString('ru-RU')`: grupy tysięcy oddzielone
/// twardą spacją (U+00A0).
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('\u{a0}');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_price(amount: i64) -> String {
    format!("{} ₽", format_amount(amount))
}

fn session_query(session: Option<&str>) -> String {
    session
        .map(|s| format!("?session={}", urlencoding::encode(s)))
        .unwrap_or_default()
}

pub fn products_url(session: Option<&str>) -> String {
    format!("/htmx/products{}", session_query(session))
}

pub fn page_url(session: Option<&str>) -> String {
    format!("/{}", session_query(session))
}

pub fn add_to_cart_url(id: i64, session: Option<&str>) -> String {
    format!("/htmx/cart/add/{}{}", id, session_query(session))
}

pub fn change_qty_url(id: i64, delta: i32) -> String {
    format!("/htmx/cart/change/{}?delta={}", id, delta)
}

pub fn product_card(product: &Product, session: Option<&str>) -> Markup {
    html! {
        div .card data-product-id=(product.id) {
            div .card-title { (product.name) }
            @if !product.brand.is_empty() {
                div .card-brand { (product.brand) }
            }
            @if !product.volume.is_empty() {
                div .card-volume { (product.volume) }
            }
            @if !product.description.is_empty() {
                div .card-description { (product.description) }
            }
            div .card-price { (format_price(product.price)) }
            button .add-to-cart
                type="button"
                "hx-post"=(add_to_cart_url(product.id, session))
                "hx-target"="#cartItems"
                "hx-swap"="innerHTML"
                title=(format!("Добавить {} в корзину", product.name))
            {
                "+ Добавить"
            }
        }
    }
}

/// Zawartość kontenera `#products`: jedna karta na produkt.
pub fn product_grid(products: &[Product], session: Option<&str>) -> Markup {
    html! {
        @for product in products {
            (product_card(product, session))
        }
    }
}

/// Komunikat w miejscu listy produktów, gdy katalogu nie udało się załadować.
pub fn catalog_message(
    err: &CatalogError,
    session: Option<&str>,
    verification_url: Option<&str>,
) -> Markup {
    match err {
        CatalogError::Empty => html! {
            p .catalog-message.empty { "Товары не найдены." }
        },
        err if err.is_retryable() => html! {
            div .catalog-message.error-block {
                p { "Не удалось загрузить товары." }
                pre .error-text { (err.to_string()) }
                a .retry-link
                    href=(page_url(session))
                    "hx-get"=(products_url(session))
                    "hx-target"="#products"
                    "hx-swap"="innerHTML"
                {
                    "Повторить"
                }
                @if let Some(url) = verification_url {
                    " · "
                    a .verify-link href=(url) target="_blank" rel="noopener" {
                        "Проверить данные"
                    }
                }
            }
        },
        _ => html! {
            p .catalog-message.error {
                "Не указан идентификатор сессии. Откройте каталог через бота."
            }
        },
    }
}

/// Linie koszyka w `#cartItems`.
pub fn cart_lines(summary: &CartSummary) -> Markup {
    html! {
        @if summary.lines.is_empty() {
            p .cart-empty { "Корзина пуста" }
        } @else {
            @for line in &summary.lines {
                div .cart-item data-product-id=(line.id) {
                    div .cart-item-name { (line.name) }
                    div .qty-controls {
                        button .qty-btn
                            type="button"
                            "hx-post"=(change_qty_url(line.id, -1))
                            "hx-target"="#cartItems"
                            "hx-swap"="innerHTML"
                        {
                            "−"
                        }
                        span .qty { (line.quantity) }
                        button .qty-btn
                            type="button"
                            "hx-post"=(change_qty_url(line.id, 1))
                            "hx-target"="#cartItems"
                            "hx-swap"="innerHTML"
                        {
                            "+"
                        }
                    }
                    div .cart-item-price { (format_price(line.subtotal)) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CartLine;

    fn product(name: &str) -> Product {
        Product {
            id: 3,
            article: "X-3".into(),
            name: name.into(),
            brand: "Laneige".into(),
            volume: "50ml".into(),
            price: 1500,
            description: String::new(),
        }
    }

    #[test]
    fn amounts_are_grouped_with_non_breaking_spaces() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(19770), "19\u{a0}770");
        assert_eq!(format_amount(1234567), "1\u{a0}234\u{a0}567");
        assert_eq!(format_amount(-39540), "-39\u{a0}540");
        assert_eq!(format_price(39540), "39\u{a0}540 ₽");
    }

    #[test]
    fn product_fields_are_escaped() {
        let html = product_card(&product("<img src=x onerror=alert(1)>"), Some("s1")).into_string();
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    }

    #[test]
    fn add_button_carries_product_id_and_session() {
        let html = product_card(&product("Cream"), Some("a&b")).into_string();
        assert!(html.contains("/htmx/cart/add/3?session=a%26b"));
    }

    #[test]
    fn grid_renders_one_card_per_product() {
        let products = vec![product("A"), product("B")];
        let html = product_grid(&products, None).into_string();
        assert_eq!(html.matches("class=\"card\"").count(), 2);
    }

    #[test]
    fn empty_catalog_message_has_no_cards() {
        let html = catalog_message(&CatalogError::Empty, Some("s1"), None).into_string();
        assert!(html.contains("Товары не найдены."));
        assert!(!html.contains("class=\"card\""));
        assert!(!html.contains("retry-link"));
    }

    #[test]
    fn missing_session_message_offers_no_retry() {
        let html = catalog_message(&CatalogError::MissingSession, None, None).into_string();
        assert!(html.contains("Не указан идентификатор сессии"));
        assert!(!html.contains("retry-link"));
    }

    #[test]
    fn malformed_payload_gets_error_block() {
        let err = CatalogError::Malformed("expected a sequence".into());
        let html = catalog_message(&err, Some("s1"), None).into_string();
        assert!(html.contains("Nieprawidłowa odpowiedź: expected a sequence"));
        assert!(html.contains("retry-link"));
        assert!(!html.contains("verify-link"));
    }

    #[test]
    fn status_error_block_has_retry_and_verification_links() {
        let err = CatalogError::Status {
            status: 502,
            body: "<b>Bad gateway</b>".into(),
        };
        let html =
            catalog_message(&err, Some("s1"), Some("https://api.example.com/api/products?session=s1"))
                .into_string();
        assert!(html.contains("HTTP 502: &lt;b&gt;Bad gateway&lt;/b&gt;"));
        assert!(html.contains("hx-get=\"/htmx/products?session=s1\""));
        assert!(html.contains("href=\"https://api.example.com/api/products?session=s1\""));
    }

    #[test]
    fn cart_lines_show_quantity_controls_and_subtotal() {
        let summary = CartSummary {
            lines: vec![CartLine {
                id: 1,
                name: "Jinsul Cream Rich".into(),
                quantity: 2,
                unit_price: 19770,
                subtotal: 39540,
            }],
            total_price: 39540,
            line_count: 1,
        };
        let html = cart_lines(&summary).into_string();
        assert!(html.contains("/htmx/cart/change/1?delta=-1"));
        assert!(html.contains("/htmx/cart/change/1?delta=1"));
        assert!(html.contains("39\u{a0}540 ₽"));
    }

    #[test]
    fn empty_cart_renders_placeholder() {
        let html = cart_lines(&CartSummary::default()).into_string();
        assert!(html.contains("Корзина пуста"));
    }
}
