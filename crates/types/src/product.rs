//! Catalog product types.

use crate::{ProductId, Review};
use rust_decimal::Decimal;

/// A catalog product row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Generated surrogate key.
    pub id: ProductId,

    /// Product name.
    pub name: String,

    /// Optional free-text description.
    pub description: Option<String>,

    /// Unit price (`NUMERIC`, strictly positive).
    pub price: Decimal,

    /// Units on hand (strictly positive; the schema forbids selling out).
    pub stock: i32,
}

/// A product together with all of its reviews, as returned by the
/// browse-product read path.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    /// The product row.
    pub product: Product,

    /// Every review posted for the product, in store order.
    pub reviews: Vec<Review>,
}

impl ProductPage {
    /// Number of reviews on the page.
    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }
}
