//! Shopping cart state and operations.
//!
//! A [`Cart`] holds an ordered list of lines plus the drawer visibility
//! flag. Lines keep display order (first add wins the slot) and there is
//! at most one line per product; adding an existing product bumps its
//! quantity instead.

pub mod store;

pub use store::CartStore;

use m2verse_core::ProductId;
use rust_decimal::Decimal;

use crate::catalog::Product;

/// One product plus the quantity selected.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Line subtotal at the current unit price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.item.price * Decimal::from(self.quantity)
    }
}

/// Shopping cart for a single session.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    open: bool,
}

impl Cart {
    /// Add one unit of a product.
    ///
    /// Increments the existing line if the product is already in the
    /// cart, otherwise appends a new line with quantity 1. Always
    /// succeeds.
    pub fn add_item(&mut self, item: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            });
        }
    }

    /// Remove the line for a product. Absent products are a no-op.
    pub fn remove_item(&mut self, id: ProductId) {
        self.lines.retain(|l| l.item.id != id);
    }

    /// Set the quantity of a line.
    ///
    /// A quantity of zero or less removes the line. Unknown products are
    /// a no-op.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Empty the cart. Does not touch the drawer flag.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across all lines (not the line count).
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `unit price * quantity` across all lines.
    ///
    /// Uses each line's current unit price; there is no price lock-in at
    /// add time.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Set the drawer visibility flag.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Flip the drawer visibility flag.
    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    /// Whether the drawer is visible.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in display (insertion) order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
}
