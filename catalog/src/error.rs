//! Catalog errors.

use thiserror::Error;

/// Business rule violations reported by [`Catalog`](crate::Catalog).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("category already exists: {0}")]
    CategoryExists(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("product {id} already listed in category {category}")]
    DuplicateProduct { category: String, id: u32 },

    #[error("invalid price for product {id}: {price}")]
    InvalidPrice { id: u32, price: f64 },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
