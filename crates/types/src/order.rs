//! Order line-item types.

use crate::ProductId;
use indexmap::IndexMap;

/// The product/quantity pairs of one order.
///
/// Entries keep insertion order, which is also the order the submit path
/// applies stock decrements and detail inserts in. Inserting a product id
/// that is already present overwrites its quantity (last writer wins) rather
/// than adding a second entry, so an order never carries duplicate lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItems {
    items: IndexMap<ProductId, i32>,
}

impl LineItems {
    /// Create an empty set of line items.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one line, overwriting the quantity if the product is already
    /// present.
    pub fn insert(&mut self, product_id: ProductId, quantity: i32) {
        self.items.insert(product_id, quantity);
    }

    /// Number of distinct products in the order.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the order has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductId, i32)> + '_ {
        self.items.iter().map(|(id, qty)| (*id, *qty))
    }
}

impl FromIterator<(ProductId, i32)> for LineItems {
    fn from_iter<I: IntoIterator<Item = (ProductId, i32)>>(iter: I) -> Self {
        let mut items = Self::new();
        for (id, qty) in iter {
            items.insert(id, qty);
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let items: LineItems = [(ProductId(9), 1), (ProductId(2), 3), (ProductId(5), 2)]
            .into_iter()
            .collect();

        let ids: Vec<_> = items.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ProductId(9), ProductId(2), ProductId(5)]);
    }

    #[test]
    fn repeated_product_keeps_one_line_with_last_quantity() {
        let mut items = LineItems::new();
        items.insert(ProductId(4), 1);
        items.insert(ProductId(7), 2);
        items.insert(ProductId(4), 3);

        assert_eq!(items.len(), 2);
        let lines: Vec<_> = items.iter().collect();
        assert_eq!(lines, vec![(ProductId(4), 3), (ProductId(7), 2)]);
    }

    #[test]
    fn empty_is_empty() {
        let items = LineItems::new();
        assert!(items.is_empty());
        assert_eq!(items.len(), 0);
    }
}
