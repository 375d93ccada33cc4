//! Carts service errors.

use std::num::TryFromIntError;

use sqlx::Error;
use thiserror::Error;

use crate::domain::products::ProductsServiceError;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("Cart not found")]
    NotFound,

    #[error("Item not found in cart")]
    ItemNotFound,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Amount must be at least 1")]
    InvalidQuantity,

    #[error("Amount is too large")]
    QuantityOverflow,

    #[error("catalog error")]
    Catalog(#[source] ProductsServiceError),

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("numeric value out of range")]
    OutOfRange(#[from] TryFromIntError),
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}

impl From<ProductsServiceError> for CartsServiceError {
    fn from(error: ProductsServiceError) -> Self {
        match error {
            ProductsServiceError::NotFound => Self::ProductNotFound,
            ProductsServiceError::Sql(error) => Self::Sql(error),
            other => Self::Catalog(other),
        }
    }
}

/// Convert a requested amount into a line quantity.
///
/// # Errors
///
/// Returns [`CartsServiceError::InvalidQuantity`] for amounts below 1 and
/// [`CartsServiceError::QuantityOverflow`] for amounts that do not fit a line.
pub fn line_quantity(amount: i64) -> Result<u32, CartsServiceError> {
    if amount < 1 {
        return Err(CartsServiceError::InvalidQuantity);
    }

    u32::try_from(amount).map_err(|_| CartsServiceError::QuantityOverflow)
}
