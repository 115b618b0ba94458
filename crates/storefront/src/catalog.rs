//! Product catalog loaded from a JSON seed file at startup.
//!
//! The catalog is the single source of truth for products and
//! testimonials. Category listings are derived from the products
//! themselves rather than maintained by hand, so counts can never
//! drift from the actual inventory.

use std::path::Path;
use std::sync::Arc;

use m2verse_core::ProductId;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Synthetic category that matches every product.
pub const ALL_CATEGORY: &str = "Todas";

/// A single action figure in the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    pub image: String,
    pub category: String,
    pub description: String,
    pub rating: f32,
    pub reviews: u32,
    pub in_stock: bool,
    #[serde(default)]
    pub badge: Option<String>,
}

/// A customer testimonial shown on the home page.
#[derive(Debug, Clone, Deserialize)]
pub struct Testimonial {
    pub id: u32,
    pub name: String,
    pub avatar: String,
    pub text: String,
    pub rating: u8,
}

/// A category name with the number of products it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: String,
    pub count: usize,
}

/// Raw shape of the catalog seed file.
#[derive(Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
    testimonials: Vec<Testimonial>,
}

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// In-memory catalog shared across request handlers.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
    testimonials: Arc<Vec<Testimonial>>,
}

impl Catalog {
    /// Load the catalog from a JSON seed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. A broken
    /// catalog is a startup failure, not something to limp along with.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io(e.to_string()))?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(
            products = catalog.products.len(),
            testimonials = catalog.testimonials.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Ok(Self {
            products: Arc::new(file.products),
            testimonials: Arc::new(file.testimonials),
        })
    }

    /// Get all products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Get a product by ID.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get products in a category. [`ALL_CATEGORY`] matches everything.
    #[must_use]
    pub fn products_in_category(&self, category: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| category == ALL_CATEGORY || p.category == category)
            .collect()
    }

    /// Get category summaries derived from the products.
    ///
    /// [`ALL_CATEGORY`] comes first with the total count, followed by the
    /// real categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<CategorySummary> {
        let mut summaries = vec![CategorySummary {
            name: ALL_CATEGORY.to_string(),
            count: self.products.len(),
        }];

        for product in self.products.iter() {
            if let Some(existing) = summaries.iter_mut().find(|s| s.name == product.category) {
                existing.count += 1;
            } else {
                summaries.push(CategorySummary {
                    name: product.category.clone(),
                    count: 1,
                });
            }
        }

        summaries
    }

    /// Get all testimonials.
    #[must_use]
    pub fn testimonials(&self) -> &[Testimonial] {
        &self.testimonials
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "products": [
            {
                "id": 1,
                "name": "Guardiã Supernova",
                "price": "89.99",
                "original_price": "119.99",
                "image": "/static/img/product-1.jpg",
                "category": "Superhero",
                "description": "Articulação premium.",
                "rating": 4.9,
                "reviews": 128,
                "in_stock": true,
                "badge": "Mais Vendido"
            },
            {
                "id": 3,
                "name": "Ciber Ninja",
                "price": "69.99",
                "image": "/static/img/product-3.png",
                "category": "Ninja",
                "description": "Katana de energia.",
                "rating": 4.7,
                "reviews": 84,
                "in_stock": false
            },
            {
                "id": 7,
                "name": "Guardiã Lunar",
                "price": "99.99",
                "image": "/static/img/product-7.png",
                "category": "Superhero",
                "description": "Edição noturna.",
                "rating": 4.5,
                "reviews": 12,
                "in_stock": true
            }
        ],
        "testimonials": [
            {
                "id": 1,
                "name": "Alex Rodriguez",
                "avatar": "/static/img/testimonial-1.jpg",
                "text": "A melhor adição à minha coleção!",
                "rating": 5
            }
        ]
    }"#;

    #[test]
    fn test_parses_prices_as_decimals() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let product = catalog.product(ProductId::new(1)).unwrap();
        assert_eq!(product.price, "89.99".parse::<Decimal>().unwrap());
        assert_eq!(
            product.original_price,
            Some("119.99".parse::<Decimal>().unwrap())
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let product = catalog.product(ProductId::new(3)).unwrap();
        assert_eq!(product.original_price, None);
        assert_eq!(product.badge, None);
        assert!(!product.in_stock);
    }

    #[test]
    fn test_product_lookup_by_id() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(
            catalog.product(ProductId::new(7)).map(|p| p.name.as_str()),
            Some("Guardiã Lunar")
        );
        assert!(catalog.product(ProductId::new(999)).is_none());
    }

    #[test]
    fn test_categories_derived_from_products() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let categories = catalog.categories();

        assert_eq!(
            categories,
            vec![
                CategorySummary {
                    name: "Todas".to_string(),
                    count: 3
                },
                CategorySummary {
                    name: "Superhero".to_string(),
                    count: 2
                },
                CategorySummary {
                    name: "Ninja".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_category_filter() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();

        assert_eq!(catalog.products_in_category(ALL_CATEGORY).len(), 3);
        assert_eq!(catalog.products_in_category("Superhero").len(), 2);
        assert_eq!(catalog.products_in_category("Mecha").len(), 0);
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let result = Catalog::from_json("{not json");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_seed_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("content/catalog.json");
        let catalog = Catalog::load(&path).unwrap();

        assert_eq!(catalog.products().len(), 4);
        assert_eq!(catalog.testimonials().len(), 3);

        let categories = catalog.categories();
        assert_eq!(categories.first().map(|c| c.name.as_str()), Some("Todas"));
        assert_eq!(categories.first().map(|c| c.count), Some(4));
    }
}
