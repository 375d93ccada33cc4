//! Pricing Config

use clap::Args;

use storefront_app::domain::orders::pricing::PricingPolicy;

/// Checkout pricing settings, all amounts in cents.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// Orders with an items price above this ship for free
    #[arg(long, env = "FREE_SHIPPING_THRESHOLD", default_value_t = 10_000_u64)]
    pub free_shipping_threshold: u64,

    /// Shipping charged below the free shipping threshold
    #[arg(long, env = "FLAT_SHIPPING_PRICE", default_value_t = 1_000_u64)]
    pub flat_shipping_price: u64,

    /// Tax rate applied to the items price, in whole percent
    #[arg(
        long,
        env = "TAX_RATE_PERCENT",
        default_value_t = 10_u8,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub tax_rate_percent: u8,
}

impl PricingConfig {
    #[must_use]
    pub fn policy(&self) -> PricingPolicy {
        PricingPolicy {
            free_shipping_threshold: self.free_shipping_threshold,
            flat_shipping_price: self.flat_shipping_price,
            tax_rate_percent: self.tax_rate_percent,
        }
    }
}
