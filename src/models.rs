// src/models.rs
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

/// Źródło katalogu produktów wybierane w konfiguracji.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum CatalogSourceKind {
    /// Wbudowane dane przykładowe
    Static,
    /// `GET /api/products?session=<id>` na zewnętrznym serwerze
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub article: String,
    #[validate(length(min = 1, message = "Nazwa produktu nie może być pusta"))]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub volume: String,
    /// Cena w pełnych rublach
    #[validate(range(
        min = 0,
        max = 1_000_000_000,
        message = "Cena musi mieścić się w przedziale 0..=1 000 000 000"
    ))]
    pub price: i64,
    #[serde(default)]
    pub description: String,
}

// --- STRUKTURY DLA KOSZYKA ---

/// Pozycja koszyka: kopia danych produktu plus ilość (zawsze >= 1).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartEntry {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartEntry {
    /// Wartość pozycji; przy przepełnieniu zatrzymuje się na `i64::MAX`.
    pub fn subtotal(&self) -> i64 {
        self.product.price.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartLine {
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// Stan koszyka przeliczony od zera, gotowy do renderowania.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total_price: i64,
    pub line_count: usize,
}

// --- PAYLOAD DLA BOTA ---

/// Wiadomość przekazywana do `Telegram.WebApp.sendData`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderPayload {
    pub action: String,
    pub order: String,
    pub total: i64,
}

impl OrderPayload {
    pub fn new(order: String, total: i64) -> Self {
        OrderPayload {
            action: "order".to_string(),
            order,
            total,
        }
    }
}

// --- PARAMETRY ZAPYTAŃ ---

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SessionParams {
    #[serde(default)]
    pub session: Option<String>,
}

impl SessionParams {
    /// Pusty parametr traktujemy jak brak sesji.
    pub fn session(&self) -> Option<&str> {
        self.session
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeQtyParams {
    pub delta: i32,
}
