//! Catalog service - read model over products and categories
//!
//! The catalog collaborator owns the data; this service caches it in memory
//! and answers the two questions the mutation engine asks: "what is this
//! product" and "does its category count against the course limit".

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use shared::models::{Category, CourseClass, Product};

/// Product metadata for rule checks and order-line snapshots
#[derive(Debug, Clone)]
pub struct ProductMeta {
    pub name: String,
    pub category_id: i64,
    pub category_name: String,
    pub course_class: CourseClass,
    pub price: f64,
}

/// In-memory catalog read model
#[derive(Default)]
pub struct CatalogService {
    products: Arc<RwLock<HashMap<i64, Product>>>,
    categories: Arc<RwLock<HashMap<i64, Category>>>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("products", &self.products.read().len())
            .field("categories", &self.categories.read().len())
            .finish()
    }
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached catalog with a fresh collaborator feed
    pub fn load(&self, products: Vec<Product>, categories: Vec<Category>) {
        let mut product_map = self.products.write();
        let mut category_map = self.categories.write();
        product_map.clear();
        category_map.clear();
        for category in categories {
            category_map.insert(category.id, category);
        }
        for product in products {
            product_map.insert(product.id, product);
        }
    }

    /// Metadata for one active product; `None` for unknown or inactive ids
    pub fn product_meta(&self, product_id: i64) -> Option<ProductMeta> {
        let products = self.products.read();
        let product = products.get(&product_id).filter(|p| p.is_active)?;
        let categories = self.categories.read();
        let category = categories.get(&product.category_id);
        Some(ProductMeta {
            name: product.name.clone(),
            category_id: product.category_id,
            category_name: category.map(|c| c.name.clone()).unwrap_or_default(),
            course_class: category.map(|c| c.course_class).unwrap_or_default(),
            price: product.price,
        })
    }

    /// Course class of a product's category; `None` for unknown products
    pub fn course_class_of(&self, product_id: i64) -> Option<CourseClass> {
        let products = self.products.read();
        let product = products.get(&product_id)?;
        let categories = self.categories.read();
        Some(
            categories
                .get(&product.category_id)
                .map(|c| c.course_class)
                .unwrap_or_default(),
        )
    }

    /// Names of the active exempt categories (what is still orderable
    /// during a cooldown), sorted for stable error messages
    pub fn exempt_category_names(&self) -> Vec<String> {
        let categories = self.categories.read();
        let mut names: Vec<String> = categories
            .values()
            .filter(|c| c.is_active && c.course_class.is_exempt())
            .map(|c| c.name.clone())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> CatalogService {
        let catalog = CatalogService::new();
        catalog.load(
            vec![
                Product::new(1, "tagliatelle", 5, 9.5),
                Product::new(2, "cola", 150, 3.0),
            ],
            vec![
                Category::new(5, "primi", CourseClass::Regular),
                Category::new(150, "bevande", CourseClass::Exempt),
            ],
        );
        catalog
    }

    #[test]
    fn product_meta_joins_category() {
        let catalog = fixture();
        let meta = catalog.product_meta(1).unwrap();
        assert_eq!(meta.category_name, "primi");
        assert_eq!(meta.course_class, CourseClass::Regular);
        assert!(catalog.product_meta(99).is_none());
    }

    #[test]
    fn exempt_names_are_sorted_and_filtered() {
        let catalog = fixture();
        assert_eq!(catalog.exempt_category_names(), vec!["bevande"]);
    }

    #[test]
    fn inactive_products_are_hidden() {
        let catalog = CatalogService::new();
        let mut product = Product::new(1, "off-menu", 5, 1.0);
        product.is_active = false;
        catalog.load(vec![product], vec![Category::new(5, "primi", CourseClass::Regular)]);
        assert!(catalog.product_meta(1).is_none());
    }
}
