//! Cart Records

use jiff::Timestamp;

use crate::{
    auth::UserUuid,
    domain::{
        carts::errors::CartsServiceError,
        products::records::{ProductRecord, ProductUuid},
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Item Record
///
/// Title, list price and image are copied from the catalog when the line is
/// first added and do not follow later catalog changes. Discounts are applied
/// at checkout, not in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemRecord {
    pub product_uuid: ProductUuid,
    pub title: String,
    pub price: u64,
    pub quantity: u32,
    pub image: String,
}

impl CartItemRecord {
    /// Capture the current catalog state of `product`.
    #[must_use]
    pub fn snapshot(product: &ProductRecord, quantity: u32) -> Self {
        Self {
            product_uuid: product.uuid,
            title: product.title.clone(),
            price: product.price,
            quantity,
            image: product.image.clone(),
        }
    }

    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

/// Cart Record
///
/// `total` and `item_count` are derived from the items after every change and
/// cannot be set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub owner: UserUuid,
    items: Vec<CartItemRecord>,
    total: u64,
    item_count: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    /// An empty cart for `owner`.
    #[must_use]
    pub fn new(owner: UserUuid, now: Timestamp) -> Self {
        Self::from_parts(CartUuid::new(), owner, Vec::new(), now, now)
    }

    /// Rebuild a cart from stored parts.
    #[must_use]
    pub fn from_parts(
        uuid: CartUuid,
        owner: UserUuid,
        items: Vec<CartItemRecord>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        let mut cart = Self {
            uuid,
            owner,
            items,
            total: 0,
            item_count: 0,
            created_at,
            updated_at,
        };

        cart.recompute_totals();

        cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItemRecord] {
        &self.items
    }

    #[must_use]
    pub fn item(&self, product: ProductUuid) -> Option<&CartItemRecord> {
        self.items.iter().find(|item| item.product_uuid == product)
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn item_count(&self) -> u64 {
        self.item_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of `product`, keeping the snapshot of an existing line.
    pub(crate) fn add(
        &mut self,
        product: &ProductRecord,
        quantity: u32,
    ) -> Result<(), CartsServiceError> {
        match self.position(product.uuid) {
            Some(index) => {
                let item = &mut self.items[index];

                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartsServiceError::QuantityOverflow)?;
            }
            None => self.items.push(CartItemRecord::snapshot(product, quantity)),
        }

        self.recompute_totals();

        Ok(())
    }

    /// Fold `quantity` of `product` into the cart, refreshing the line's
    /// snapshot from `product`.
    pub(crate) fn merge(
        &mut self,
        product: &ProductRecord,
        quantity: u32,
    ) -> Result<(), CartsServiceError> {
        let existing = self.position(product.uuid);

        let merged = existing
            .map_or(Some(quantity), |index| {
                self.items[index].quantity.checked_add(quantity)
            })
            .ok_or(CartsServiceError::QuantityOverflow)?;

        let snapshot = CartItemRecord::snapshot(product, merged);

        match existing {
            Some(index) => self.items[index] = snapshot,
            None => self.items.push(snapshot),
        }

        self.recompute_totals();

        Ok(())
    }

    pub(crate) fn set_quantity(
        &mut self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), CartsServiceError> {
        let index = self
            .position(product)
            .ok_or(CartsServiceError::ItemNotFound)?;

        self.items[index].quantity = quantity;

        self.recompute_totals();

        Ok(())
    }

    /// Drop the line for `product`, if any.
    pub(crate) fn remove(&mut self, product: ProductUuid) {
        self.items.retain(|item| item.product_uuid != product);

        self.recompute_totals();
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();

        self.recompute_totals();
    }

    pub(crate) fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    fn position(&self, product: ProductUuid) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_uuid == product)
    }

    fn recompute_totals(&mut self) {
        self.total = self
            .items
            .iter()
            .fold(0, |total: u64, item| total.saturating_add(item.line_total()));

        self.item_count = self
            .items
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum();
    }
}
