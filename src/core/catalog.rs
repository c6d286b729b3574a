//! Product catalog
//!
//! Holds products and the categories grouping them, and enforces the
//! referential guards between them:
//! - A category referenced by a product cannot be deleted
//! - A product with recorded transactions cannot be deleted
//!
//! The catalog never stores stock. Stock is derived from the transaction log.

use crate::core::traits::TransactionRepository;
use crate::types::{Category, CategoryId, InventoryError, NewProduct, Product, ProductId};
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Products and categories keyed by id
///
/// `BTreeMap` keeps listings sorted by id, which fixes the row order of every
/// report.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCategory` if the id is already taken.
    pub fn add_category(&mut self, category: Category) -> Result<(), InventoryError> {
        if self.categories.contains_key(&category.id) {
            return Err(InventoryError::duplicate_category(&category.id));
        }
        self.categories.insert(category.id.clone(), category);
        Ok(())
    }

    /// Replace an existing category
    ///
    /// # Errors
    ///
    /// Returns `CategoryNotFound` if no category has this id.
    pub fn update_category(&mut self, category: Category) -> Result<(), InventoryError> {
        match self.categories.get_mut(&category.id) {
            Some(existing) => {
                *existing = category;
                Ok(())
            }
            None => Err(InventoryError::category_not_found(&category.id)),
        }
    }

    /// Remove a category that no product references
    ///
    /// # Errors
    ///
    /// Returns `CategoryInUse` if a product still belongs to the category, or
    /// `CategoryNotFound` if it does not exist.
    pub fn delete_category(&mut self, category_id: &str) -> Result<Category, InventoryError> {
        if self
            .products
            .values()
            .any(|product| product.category_id == category_id)
        {
            return Err(InventoryError::category_in_use(category_id));
        }

        self.categories
            .remove(category_id)
            .ok_or_else(|| InventoryError::category_not_found(category_id))
    }

    /// Add a product and return the id it was stored under
    ///
    /// The id is the explicit one when given, otherwise the SKU, otherwise a
    /// random UUID.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateProduct` if the resolved id is already taken.
    pub fn add_product(&mut self, new: NewProduct) -> Result<ProductId, InventoryError> {
        let id = resolve_product_id(&new);

        if self.products.contains_key(&id) {
            return Err(InventoryError::duplicate_product(&id));
        }

        debug!(product = %id, category = %new.category_id, "product added");
        self.products.insert(id.clone(), new.into_product(id.clone()));
        Ok(id)
    }

    /// Replace an existing product
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if no product has this id.
    pub fn update_product(&mut self, product: Product) -> Result<(), InventoryError> {
        match self.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product;
                Ok(())
            }
            None => Err(InventoryError::product_not_found(&product.id)),
        }
    }

    /// Remove a product that has no recorded transactions
    ///
    /// # Errors
    ///
    /// Returns `ProductHasTransactions` if `repository` holds any transaction
    /// for the product, or `ProductNotFound` if it does not exist.
    pub fn delete_product<R>(
        &mut self,
        product_id: &str,
        repository: &R,
    ) -> Result<Product, InventoryError>
    where
        R: TransactionRepository + ?Sized,
    {
        if repository.has_transactions(product_id) {
            return Err(InventoryError::product_has_transactions(product_id));
        }

        self.products
            .remove(product_id)
            .ok_or_else(|| InventoryError::product_not_found(product_id))
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Look up a product that must exist
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` for an unknown id.
    pub fn require_product(&self, product_id: &str) -> Result<&Product, InventoryError> {
        self.product(product_id)
            .ok_or_else(|| InventoryError::product_not_found(product_id))
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.get(category_id)
    }

    /// All products, sorted by id
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// All categories, sorted by id
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Products belonging to `category_id`, sorted by id
    pub fn products_in_category<'a>(
        &'a self,
        category_id: &'a str,
    ) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .values()
            .filter(move |product| product.category_id == category_id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn resolve_product_id(new: &NewProduct) -> ProductId {
    [new.id.as_deref(), Some(new.sku.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
