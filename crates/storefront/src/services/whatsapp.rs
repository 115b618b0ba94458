//! WhatsApp deep links.
//!
//! The shop closes sales over WhatsApp rather than through an online
//! checkout, so product cards, the quick-view dialog and the contact
//! section all point at `wa.me` with a pre-filled message.

/// Pre-filled text for the general order button.
const ORDER_MESSAGE: &str = "Olá! Gostaria de fazer um pedido/orçamento.";

/// Pre-filled text for the full-catalog request button.
const CATALOG_MESSAGE: &str = "Olá! Gostaria de ver o catálogo completo de produtos.";

/// Builds `wa.me` links for the shop's WhatsApp number.
///
/// The number is kept in international format without `+` or
/// separators, exactly as `wa.me` expects it in the path segment.
#[derive(Debug, Clone)]
pub struct WhatsAppLinks {
    number: String,
}

impl WhatsAppLinks {
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
        }
    }

    /// Link for a general order or quote conversation.
    #[must_use]
    pub fn order_link(&self) -> String {
        self.link(ORDER_MESSAGE)
    }

    /// Link asking about a single product by name.
    #[must_use]
    pub fn product_link(&self, product_name: &str) -> String {
        let message = format!(
            "Olá! Tenho interesse no produto: {product_name}. Poderia me passar mais informações e o orçamento?"
        );
        self.link(&message)
    }

    /// Link requesting the complete catalog.
    #[must_use]
    pub fn catalog_link(&self) -> String {
        self.link(CATALOG_MESSAGE)
    }

    fn link(&self, message: &str) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.number,
            urlencoding::encode(message)
        )
    }
}
