// src/cart.rs

use std::collections::BTreeMap;

use crate::models::{CartEntry, CartLine, CartSummary, OrderPayload, Product};

/// Wynik operacji na koszyku. `Unchanged` oznacza nieznane ID produktu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    Inserted,
    Updated,
    Removed,
    Unchanged,
}

/// Koszyk jednej sesji Mini App.
///
/// Pozycje są trzymane w kolejności rosnących ID produktów. Każda pozycja ma
/// ilość co najmniej 1, a `line_count` zmienia się wyłącznie przy wstawieniu
/// lub usunięciu pozycji.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    session: Option<String>,
    entries: BTreeMap<i64, CartEntry>,
    line_count: usize,
}

impl Cart {
    pub fn for_session(session: Option<&str>) -> Self {
        Cart {
            session: session.map(str::to_owned),
            ..Cart::default()
        }
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    #[cfg(test)]
    pub fn quantity_of(&self, id: i64) -> Option<u32> {
        self.entries.get(&id).map(|entry| entry.quantity)
    }

    #[cfg(test)]
    pub fn entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.values()
    }

    /// Dodaje produkt z katalogu: nowa pozycja z ilością 1 albo +1 do istniejącej.
    pub fn add_to_cart(&mut self, catalog: &[Product], id: i64) -> CartOutcome {
        let Some(product) = catalog.iter().find(|p| p.id == id) else {
            return CartOutcome::Unchanged;
        };

        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.quantity = entry.quantity.saturating_add(1);
                CartOutcome::Updated
            }
            None => {
                self.entries.insert(
                    id,
                    CartEntry {
                        product: product.clone(),
                        quantity: 1,
                    },
                );
                self.line_count += 1;
                CartOutcome::Inserted
            }
        }
    }

    /// Zmienia ilość o `delta`. Pozycja znika, gdy ilość spadłaby do zera lub niżej.
    pub fn change_qty(&mut self, id: i64, delta: i32) -> CartOutcome {
        let Some(entry) = self.entries.get_mut(&id) else {
            return CartOutcome::Unchanged;
        };

        let new_quantity = i64::from(entry.quantity) + i64::from(delta);
        if new_quantity <= 0 {
            self.entries.remove(&id);
            self.line_count -= 1;
            return CartOutcome::Removed;
        }

        entry.quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        CartOutcome::Updated
    }

    pub fn total_price(&self) -> i64 {
        self.entries
            .values()
            .map(CartEntry::subtotal)
            .fold(0, i64::saturating_add)
    }

    /// Przelicza cały koszyk na nowo; nic nie jest brane z poprzedniego renderu.
    pub fn summary(&self) -> CartSummary {
        let lines: Vec<CartLine> = self
            .entries
            .values()
            .map(|entry| CartLine {
                id: entry.product.id,
                name: entry.product.name.clone(),
                quantity: entry.quantity,
                unit_price: entry.product.price,
                subtotal: entry.subtotal(),
            })
            .collect();
        let total_price = lines
            .iter()
            .map(|line| line.subtotal)
            .fold(0, i64::saturating_add);

        CartSummary {
            lines,
            total_price,
            line_count: self.line_count,
        }
    }

    /// Tekst zamówienia: jedna linia `nazwa ×ilość` na pozycję.
    pub fn order_text(&self) -> String {
        self.entries
            .values()
            .map(|entry| format!("{} ×{}", entry.product.name, entry.quantity))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn order_payload(&self) -> OrderPayload {
        OrderPayload::new(self.order_text(), self.total_price())
    }
}
