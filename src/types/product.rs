//! Catalog types for the inventory valuation engine
//!
//! Products and the categories grouping them. Neither type owns its
//! transactions; stock is always derived from the transaction log.

use super::transaction::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category identifier
pub type CategoryId = String;

/// A product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Category {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }
}

/// A product tracked in inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: ProductId,

    /// Display name
    pub name: String,

    pub description: String,

    /// Category the product belongs to (may be empty)
    pub category_id: CategoryId,

    /// Stock keeping unit
    pub sku: String,

    /// Stock threshold at or below which the product is reported as low
    pub min_stock: Decimal,

    /// List price per unit
    pub price: Decimal,

    pub barcode: Option<String>,
}

impl Product {
    /// Create a product with the given id and minimum stock
    ///
    /// All other descriptive fields are left empty.
    pub fn new(id: impl Into<ProductId>, min_stock: Decimal) -> Self {
        let id = id.into();
        Product {
            name: id.clone(),
            sku: id.clone(),
            id,
            description: String::new(),
            category_id: CategoryId::new(),
            min_stock,
            price: Decimal::ZERO,
            barcode: None,
        }
    }

    /// Assign the product to a category
    pub fn in_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = category_id.into();
        self
    }
}

/// A product that has not been assigned an identifier yet
///
/// When `id` is `None` the catalog uses the SKU, or a generated UUID when
/// the SKU is blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub category_id: CategoryId,
    pub sku: String,
    pub min_stock: Decimal,
    pub price: Decimal,
    pub barcode: Option<String>,
}

impl NewProduct {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            category_id: self.category_id,
            sku: self.sku,
            min_stock: self.min_stock,
            price: self.price,
            barcode: self.barcode,
        }
    }
}
