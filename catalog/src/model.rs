//! Catalog entities stored in the category tree.

use avl_rs::Contribute;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A product listed under exactly one category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: f64,
}

/// A named category and the products listed directly under it.
///
/// Categories are keyed by name in the catalog tree. A category's
/// descendants are the categories in its subtree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Category {
    pub name: String,
    pub description: String,
    pub products: Vec<Product>,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            products: Vec::new(),
        }
    }

    pub fn product(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// A category recommends every product listed under it.
impl Contribute for Category {
    type Item = Product;

    fn contribution(&self) -> Option<&[Product]> {
        Some(self.products.as_slice())
    }
}
