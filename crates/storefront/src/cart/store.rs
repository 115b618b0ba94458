//! Session-scoped cart storage.
//!
//! Carts live in process memory keyed by the cart ID stored in each
//! session. A server restart drops every cart; cart contents carry no
//! persistence contract.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use m2verse_core::CartId;

use super::Cart;

/// Shared store of all live carts.
#[derive(Debug, Default)]
pub struct CartStore {
    carts: RwLock<HashMap<CartId, Cart>>,
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutate the cart for `id`, creating an empty one on first use.
    ///
    /// Returns a snapshot of the cart after the mutation so handlers can
    /// render without holding the lock.
    pub fn with_cart<F>(&self, id: CartId, f: F) -> Cart
    where
        F: FnOnce(&mut Cart),
    {
        let mut carts = self.carts.write().unwrap_or_else(PoisonError::into_inner);
        let cart = carts.entry(id).or_default();
        f(cart);
        cart.clone()
    }

    /// Snapshot of the cart for `id`. Sessions that never touched the
    /// cart get the empty default.
    #[must_use]
    pub fn snapshot(&self, id: CartId) -> Cart {
        let carts = self.carts.read().unwrap_or_else(PoisonError::into_inner);
        carts.get(&id).cloned().unwrap_or_default()
    }

    /// Number of live carts, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        let carts = self.carts.read().unwrap_or_else(PoisonError::into_inner);
        carts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use m2verse_core::ProductId;
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::Product;

    fn product(id: i32, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Produto {id}"),
            price: price.parse().unwrap(),
            original_price: None,
            image: format!("/static/img/product-{id}.png"),
            category: "Mecha".to_string(),
            description: String::new(),
            rating: 5.0,
            reviews: 1,
            in_stock: true,
            badge: None,
        }
    }

    #[test]
    fn test_with_cart_creates_on_first_use() {
        let store = CartStore::new();
        let id = CartId::new();

        let cart = store.with_cart(id, |cart| cart.add_item(&product(1, "89.99")));

        assert_eq!(cart.total_items(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_of_untouched_session_is_empty() {
        let store = CartStore::new();

        let cart = store.snapshot(CartId::new());

        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert!(store.is_empty());
    }

    #[test]
    fn test_carts_are_isolated_per_id() {
        let store = CartStore::new();
        let first = CartId::new();
        let second = CartId::new();

        store.with_cart(first, |cart| cart.add_item(&product(1, "89.99")));
        store.with_cart(second, |cart| {
            cart.add_item(&product(4, "149.99"));
            cart.add_item(&product(4, "149.99"));
        });

        assert_eq!(store.snapshot(first).total_items(), 1);
        assert_eq!(store.snapshot(second).total_items(), 2);
    }

    #[test]
    fn test_mutations_accumulate_across_calls() {
        let store = CartStore::new();
        let id = CartId::new();
        let mecha = product(4, "149.99");

        store.with_cart(id, |cart| cart.add_item(&mecha));
        store.with_cart(id, |cart| cart.add_item(&mecha));
        let cart = store.with_cart(id, |cart| cart.set_open(true));

        assert_eq!(cart.total_items(), 2);
        assert!(cart.is_open());
        assert_eq!(cart.total_price(), "299.98".parse::<Decimal>().unwrap());
    }
}
