//! # avl-catalog
//!
//! Product recommendation by category, built on [`avl_rs::AvlTree`].
//!
//! Categories are stored in the tree keyed by name; each carries the products
//! listed under it. Recommending a category returns its own products plus the
//! products of every category in its subtree.
//!
//! ## Example
//!
//! ```rust
//! use avl_catalog::Catalog;
//!
//! let mut catalog = Catalog::new();
//! catalog.register_category("Livros", "Categoria pai").unwrap();
//! catalog.register_category("Ficção", "Gênero literário").unwrap();
//! catalog.add_product("Ficção", 101, "1984 - George Orwell", 40.0).unwrap();
//!
//! let recommended = catalog.recommend_products("Livros").unwrap();
//! let names: Vec<&str> = recommended.iter().map(|p| p.name.as_str()).collect();
//! assert_eq!(names, vec!["1984 - George Orwell"]);
//! ```

mod error;
mod model;

pub use error::{CatalogError, Result};
pub use model::{Category, Product};

use avl_rs::AvlTree;
use tracing::{debug, info};

/// Configuration for a [`Catalog`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Reject a product whose id is already listed in the same category.
    pub reject_duplicate_products: bool,
    /// Truncate recommendations to at most this many products.
    pub recommendation_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reject_duplicate_products: true,
            recommendation_limit: None,
        }
    }
}

/// Category registry with subtree recommendations.
pub struct Catalog {
    categories: AvlTree<String, Category>,
    config: Config,
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            categories: AvlTree::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of registered categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Registers a new, empty category.
    ///
    /// Names are unique: the tree itself accepts duplicate keys, so the check
    /// happens here before inserting.
    pub fn register_category(&mut self, name: &str, description: &str) -> Result<()> {
        debug!("register_category: name={}", name);
        if self.categories.contains_key(name) {
            return Err(CatalogError::CategoryExists(name.to_string()));
        }

        self.categories
            .insert(name.to_string(), Category::new(name, description));
        info!("registered category {}", name);
        Ok(())
    }

    /// Lists a product under an existing category.
    pub fn add_product(
        &mut self,
        category: &str,
        id: u32,
        name: impl Into<String>,
        price: f64,
    ) -> Result<()> {
        debug!("add_product: category={}, id={}", category, id);
        if !price.is_finite() || price < 0.0 {
            return Err(CatalogError::InvalidPrice { id, price });
        }

        let reject_duplicates = self.config.reject_duplicate_products;
        let entry = self
            .categories
            .find_mut(category)
            .ok_or_else(|| CatalogError::UnknownCategory(category.to_string()))?;

        if reject_duplicates && entry.product(id).is_some() {
            return Err(CatalogError::DuplicateProduct {
                category: category.to_string(),
                id,
            });
        }

        entry.products.push(Product {
            id,
            name: name.into(),
            price,
        });
        debug!(
            "add_product: category={} now lists {} products",
            category,
            entry.products.len()
        );
        Ok(())
    }

    /// Products of `category` and of every category below it in the tree.
    ///
    /// Order is unspecified.
    pub fn recommend_products(&self, category: &str) -> Result<Vec<&Product>> {
        if !self.categories.contains_key(category) {
            return Err(CatalogError::UnknownCategory(category.to_string()));
        }

        let mut products = self.categories.recommend(category);
        if let Some(limit) = self.config.recommendation_limit {
            products.truncate(limit);
        }
        debug!(
            "recommend_products: category={}, found {} products",
            category,
            products.len()
        );
        Ok(products)
    }

    /// Removes a category with its products. Other categories may move in the
    /// tree, which changes what they recommend.
    pub fn remove_category(&mut self, name: &str) -> Result<Category> {
        debug!("remove_category: name={}", name);
        let removed = self
            .categories
            .delete(name)
            .ok_or_else(|| CatalogError::UnknownCategory(name.to_string()))?;
        info!(
            "removed category {} with {} products",
            name,
            removed.products.len()
        );
        Ok(removed)
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.find(name)
    }

    /// Categories in name order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> + '_ {
        self.categories.iter().map(|(_, category)| category)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
