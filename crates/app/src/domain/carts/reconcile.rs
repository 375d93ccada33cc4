//! Guest cart reconciliation

use rustc_hash::FxHashMap;

use crate::domain::{
    carts::{
        data::GuestCartLine,
        errors::{CartsServiceError, line_quantity},
        records::CartRecord,
    },
    products::records::{ProductRecord, ProductUuid},
};

/// Guest lines resolved against the catalog, ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    lines: Vec<(ProductRecord, u32)>,
    skipped: Vec<ProductUuid>,
}

impl MergePlan {
    /// Resolve `guest` against the current `catalog`.
    ///
    /// Every quantity is checked before any product is considered, so a single
    /// bad line rejects the whole guest cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartsServiceError::InvalidQuantity`] when any line has an
    /// amount below 1.
    pub fn new(
        guest: &[GuestCartLine],
        catalog: Vec<ProductRecord>,
    ) -> Result<Self, CartsServiceError> {
        let quantities = guest
            .iter()
            .map(|line| line_quantity(line.quantity))
            .collect::<Result<Vec<_>, _>>()?;

        let catalog: FxHashMap<ProductUuid, ProductRecord> = catalog
            .into_iter()
            .filter(|product| product.is_active)
            .map(|product| (product.uuid, product))
            .collect();

        let mut lines = Vec::with_capacity(guest.len());
        let mut skipped = Vec::new();

        for (line, quantity) in guest.iter().zip(quantities) {
            match catalog.get(&line.product_uuid) {
                Some(product) => lines.push((product.clone(), quantity)),
                None if !skipped.contains(&line.product_uuid) => skipped.push(line.product_uuid),
                None => {}
            }
        }

        Ok(Self { lines, skipped })
    }

    #[must_use]
    pub fn skipped(&self) -> &[ProductUuid] {
        &self.skipped
    }

    /// Fold the resolved lines into `cart` in guest order.
    ///
    /// # Errors
    ///
    /// Returns [`CartsServiceError::QuantityOverflow`] if a merged line would
    /// not fit; `cart` may then be partially merged and must be discarded.
    pub fn apply(&self, cart: &mut CartRecord) -> Result<(), CartsServiceError> {
        for (product, quantity) in &self.lines {
            cart.merge(product, *quantity)?;
        }

        Ok(())
    }
}
