//! Product review types.

use crate::{ProductId, Username};
use chrono::NaiveDateTime;

/// A product review row.
///
/// The schema allows at most one review per (user, product) pair and bounds
/// the rating to the open interval (0, 5).
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Reviewing user.
    pub username: Username,

    /// Reviewed product.
    pub product_id: ProductId,

    /// Optional review body.
    pub review_text: Option<String>,

    /// Star rating, strictly between 0 and 5.
    pub rating: f64,

    /// Server-side timestamp of the posting transaction.
    pub review_date: NaiveDateTime,
}
