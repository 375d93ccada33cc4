//! Checkout pricing

use crate::domain::orders::errors::OrdersServiceError;

/// Shipping and tax rules applied at checkout. Amounts are in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Orders whose items cost strictly more than this ship for free.
    pub free_shipping_threshold: u64,
    pub flat_shipping_price: u64,
    pub tax_rate_percent: u8,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 10_000,
            flat_shipping_price: 1_000,
            tax_rate_percent: 10,
        }
    }
}

/// The four amounts frozen onto an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPricing {
    pub items_price: u64,
    pub tax_price: u64,
    pub shipping_price: u64,
    pub total_price: u64,
}

impl PricingPolicy {
    /// Price an order whose line items sum to `items_price`.
    ///
    /// Tax is rounded half-up to the nearest cent.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersServiceError::PriceOverflow`] if the total does not fit.
    pub fn price(&self, items_price: u64) -> Result<OrderPricing, OrdersServiceError> {
        let shipping_price = if items_price > self.free_shipping_threshold {
            0
        } else {
            self.flat_shipping_price
        };

        let tax = (u128::from(items_price) * u128::from(self.tax_rate_percent) + 50) / 100;
        let tax_price = u64::try_from(tax).map_err(|_| OrdersServiceError::PriceOverflow)?;

        let total_price = items_price
            .checked_add(tax_price)
            .and_then(|total| total.checked_add(shipping_price))
            .ok_or(OrdersServiceError::PriceOverflow)?;

        Ok(OrderPricing {
            items_price,
            tax_price,
            shipping_price,
            total_price,
        })
    }
}
