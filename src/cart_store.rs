// src/cart_store.rs

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cart::Cart;

const CART_STORE_CAPACITY: u64 = 50_000;

pub type SharedCart = Arc<Mutex<Cart>>;

/// Koszyki odwiedzających trzymane wyłącznie w pamięci.
///
/// Klucz to UUID z ciasteczka `cart_id`. Koszyk wygasa po `ttl` bez użycia.
/// Mutex na koszyk szereguje zmiany jednego odwiedzającego.
#[derive(Clone)]
pub struct CartStore {
    carts: Cache<Uuid, SharedCart>,
}

impl CartStore {
    pub fn new(ttl: Duration) -> Self {
        CartStore {
            carts: Cache::builder()
                .max_capacity(CART_STORE_CAPACITY)
                .time_to_idle(ttl)
                .build(),
        }
    }

    /// Zwraca koszyk odwiedzającego, tworząc pusty przy pierwszym użyciu.
    pub async fn cart_for(&self, visitor: Uuid, session: Option<&str>) -> SharedCart {
        let session = session.map(str::to_owned);
        self.carts
            .get_with(visitor, async move {
                tracing::debug!("Nowy koszyk dla odwiedzającego {}", visitor);
                Arc::new(Mutex::new(Cart::for_session(session.as_deref())))
            })
            .await
    }

    /// Koszyk dla strony otwartej w danej sesji. Jeśli zapisany koszyk należy
    /// do innej sesji, zastępujemy go pustym.
    pub async fn cart_for_page(&self, visitor: Uuid, session: Option<&str>) -> SharedCart {
        let shared = self.cart_for(visitor, session).await;
        {
            let mut cart = shared.lock().await;
            if cart.session() != session {
                tracing::info!(
                    "Zmiana sesji Mini App dla {} ({:?} -> {:?}). Nowy koszyk.",
                    visitor,
                    cart.session(),
                    session
                );
                *cart = Cart::for_session(session);
            }
        }
        shared
    }

    pub async fn existing(&self, visitor: Uuid) -> Option<SharedCart> {
        self.carts.get(&visitor).await
    }
}
