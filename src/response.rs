use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use lol_html::html_content::ContentType;
use lol_html::{HtmlRewriter, Settings, element};
use maud::Markup;
use serde_json::Value;

use crate::errors::AppError;
use crate::render;

const SHELL_TEMPLATE: &str = include_str!("../templates/index.html");

pub enum AppResponse {
    Full(Html<String>),
    Partial(Markup),
}

impl IntoResponse for AppResponse {
    fn into_response(self) -> Response {
        match self {
            AppResponse::Full(html) => html.into_response(),
            AppResponse::Partial(markup) => markup.into_response(),
        }
    }
}

/// Wszystko, czego potrzeba do złożenia pełnej strony Mini App.
pub struct PageParts {
    pub products: Markup,
    pub cart: Markup,
    pub total_price: i64,
    pub cart_count: usize,
}

/// Wstawia wyrenderowane fragmenty w szablon strony i usuwa atrybuty HTMX
/// ładujące listę produktów, żeby HTMX nie nadpisał treści po załadowaniu.
pub fn serve_full_page(page: PageParts) -> Result<Html<String>, AppError> {
    let products_html = page.products.into_string();
    let cart_html = page.cart.into_string();
    let total_text = render::format_amount(page.total_price);
    let count_text = page.cart_count.to_string();

    let mut response_body = Vec::with_capacity(SHELL_TEMPLATE.len() + products_html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("#products", |el| {
                    el.set_inner_content(&products_html, ContentType::Html);
                    el.remove_attribute("hx-trigger");
                    el.remove_attribute("hx-get");
                    Ok(())
                }),
                element!("#cartItems", |el| {
                    el.set_inner_content(&cart_html, ContentType::Html);
                    Ok(())
                }),
                element!("#totalPrice", |el| {
                    el.set_inner_content(&total_text, ContentType::Text);
                    Ok(())
                }),
                element!("#cartCount", |el| {
                    el.set_inner_content(&count_text, ContentType::Text);
                    Ok(())
                }),
            ],
            ..Settings::default()
        },
        |c: &[u8]| response_body.extend_from_slice(c),
    );

    rewriter.write(SHELL_TEMPLATE.as_bytes())?;
    rewriter.end()?;

    let html = String::from_utf8(response_body).map_err(|e| {
        tracing::error!("Szablon strony po przetworzeniu nie jest UTF-8: {}", e);
        AppError::InternalServerError("Błąd wczytywania szablonu strony".to_string())
    })?;
    Ok(Html(html))
}

/// Dla żądań HTMX zwraca sam fragment listy produktów, dla pełnych odświeżeń
/// całą stronę.
pub fn build_response(headers: &HeaderMap, page: PageParts) -> Result<AppResponse, AppError> {
    if headers.contains_key("HX-Request") {
        Ok(AppResponse::Partial(page.products))
    } else {
        serve_full_page(page).map(AppResponse::Full)
    }
}

/// JSON z wszystkimi znakami spoza ASCII zapisanymi jako `\uXXXX`.
/// Nagłówki HTTP przyjmują tylko widoczne ASCII.
pub fn ascii_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii() {
            escaped.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    escaped
}

/// Dokłada nagłówek `HX-Trigger` z podanymi zdarzeniami.
pub fn insert_hx_trigger(headers: &mut HeaderMap, payload: &Value) {
    match HeaderValue::from_str(&ascii_json(payload)) {
        Ok(value) => {
            headers.insert("HX-Trigger", value);
        }
        Err(e) => {
            tracing::error!("Nie można utworzyć nagłówka HX-Trigger: {}", e);
        }
    }
}
