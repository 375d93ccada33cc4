//! Product Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    MensClothing,
    WomensClothing,
    Jewelery,
    Electronics,
}

impl Category {
    pub const ALL: [Self; 4] = [
        Self::MensClothing,
        Self::WomensClothing,
        Self::Jewelery,
        Self::Electronics,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MensClothing => "men's clothing",
            Self::WomensClothing => "women's clothing",
            Self::Jewelery => "jewelery",
            Self::Electronics => "electronics",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: Category,
    pub image: String,
    pub stock: u32,
    pub discount: u8,
    pub is_active: bool,
    pub featured: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// Unit price after the product's discount.
    #[must_use]
    pub fn discounted_price(&self) -> u64 {
        discounted_price(self.price, self.discount)
    }
}

/// Reduce `price` by `discount` percent, rounding half-up to the nearest cent.
///
/// Discounts above 100 are treated as 100.
#[must_use]
pub fn discounted_price(price: u64, discount: u8) -> u64 {
    let remaining = u128::from(100 - discount.min(100));
    let scaled = u128::from(price) * remaining + 50;

    // `scaled / 100` never exceeds `price`.
    u64::try_from(scaled / 100).unwrap_or(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_reduces_price() {
        assert_eq!(discounted_price(2_000, 10), 1_800);
        assert_eq!(discounted_price(2_000, 0), 2_000);
        assert_eq!(discounted_price(2_000, 100), 0);
    }

    #[test]
    fn discount_rounds_half_up() {
        assert_eq!(discounted_price(999, 15), 849);
        assert_eq!(discounted_price(5, 10), 5);
        assert_eq!(discounted_price(1, 50), 1);
    }

    #[test]
    fn discount_is_capped_at_one_hundred() {
        assert_eq!(discounted_price(1_000, 250), 0);
    }

    #[test]
    fn categories_round_trip_their_labels() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().ok(), Some(category));
        }

        assert!("groceries".parse::<Category>().is_err());
    }
}
