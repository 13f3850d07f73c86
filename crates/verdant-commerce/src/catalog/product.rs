//! Product types and the in-memory catalog.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Product category used for storefront listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[default]
    Oils,
    Coffee,
    Tea,
    Skincare,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Oils => "oils",
            ProductCategory::Coffee => "coffee",
            ProductCategory::Tea => "tea",
            ProductCategory::Skincare => "skincare",
            ProductCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "oils" => Some(ProductCategory::Oils),
            "coffee" => Some(ProductCategory::Coffee),
            "tea" => Some(ProductCategory::Tea),
            "skincare" => Some(ProductCategory::Skincare),
            "other" => Some(ProductCategory::Other),
            _ => None,
        }
    }
}

/// A product that can be added to the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug (e.g., "cold-pressed-coconut-oil").
    pub slug: String,
    /// Unit price in whole rupees.
    pub price: Money,
    /// Image reference (path or URL).
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: ProductCategory,
    /// Whether the product is currently purchasable.
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

impl Product {
    /// Create a new in-stock product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        slug: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: slug.into(),
            price,
            image: String::new(),
            category: ProductCategory::default(),
            in_stock: true,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_category(mut self, category: ProductCategory) -> Self {
        self.category = category;
        self
    }
}

/// Read-only product lookup.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Find a product by slug or id.
    pub fn find(&self, key: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.slug == key || p.id.as_str() == key)
    }

    /// In-stock products in a category.
    pub fn in_category(&self, category: ProductCategory) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| p.category == category && p.in_stock)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
