//! Orders service errors.

use std::num::TryFromIntError;

use sqlx::Error;
use thiserror::Error;

use crate::domain::{
    orders::status::OrderStatus,
    products::{ProductsServiceError, records::ProductUuid},
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("{0}")]
    Invalid(String),

    #[error("Order not found")]
    NotFound,

    #[error("Not authorized to access this order")]
    Unauthorized,

    #[error("Product {0} not found or unavailable")]
    ProductNotFound(ProductUuid),

    #[error("Product {0} not found or unavailable")]
    ProductUnavailable(ProductUuid),

    #[error("Insufficient stock for {title}. Available: {available}")]
    InsufficientStock { title: String, available: u32 },

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Cannot pay for a cancelled order")]
    PaymentOnCancelled,

    #[error("order total is too large")]
    PriceOverflow,

    #[error("catalog error")]
    Catalog(#[source] ProductsServiceError),

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("numeric value out of range")]
    OutOfRange(#[from] TryFromIntError),
}

impl OrdersServiceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}

impl From<ProductsServiceError> for OrdersServiceError {
    fn from(error: ProductsServiceError) -> Self {
        match error {
            ProductsServiceError::Sql(error) => Self::Sql(error),
            other => Self::Catalog(other),
        }
    }
}
