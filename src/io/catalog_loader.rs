//! Catalog loading from the products file

use crate::core::catalog::Catalog;
use crate::io::sync_reader::ProductReader;
use crate::types::{Category, InventoryError};
use std::path::Path;
use tracing::{debug, info, warn};

/// Build a catalog from a products CSV file
///
/// Malformed rows and duplicate product ids are logged and skipped; the first
/// occurrence of an id wins. The file carries no category table, so every
/// category a product names is registered with its id as name.
///
/// # Errors
///
/// Returns `FileNotFound` or `IoError` when the file cannot be opened.
pub fn load_catalog(path: &Path) -> Result<Catalog, InventoryError> {
    let mut catalog = Catalog::new();

    for result in ProductReader::new(path)? {
        let added = result.and_then(|product| {
            let category_id = product.category_id.clone();
            catalog.add_product(product)?;
            if !category_id.is_empty() && catalog.category(&category_id).is_none() {
                debug!(category = %category_id, "registering category");
                catalog.add_category(Category::new(category_id.clone(), category_id))?;
            }
            Ok(())
        });
        if let Err(e) = added {
            warn!(error = %e, "skipping product");
        }
    }

    info!(products = catalog.len(), path = %path.display(), "catalog loaded");
    Ok(catalog)
}
