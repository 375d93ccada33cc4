//! Cart Data

use crate::domain::{carts::records::CartRecord, products::records::ProductUuid};

/// A line held by an anonymous client before sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuestCartLine {
    pub product_uuid: ProductUuid,
    pub quantity: i64,
}

/// Result of folding a guest cart into an account cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartMerge {
    pub cart: CartRecord,

    /// Guest products that are missing from the catalog or inactive.
    pub skipped: Vec<ProductUuid>,
}
