//! Order Errors

use tracing::error;

use storefront_app::domain::orders::OrdersServiceError;

use crate::errors::ApiError;

impl From<OrdersServiceError> for ApiError {
    fn from(error: OrdersServiceError) -> Self {
        match error {
            OrdersServiceError::NotFound => Self::not_found(error.to_string()),
            OrdersServiceError::Unauthorized => Self::unauthorized(error.to_string()),
            OrdersServiceError::Invalid(message) => Self::bad_request(message),
            OrdersServiceError::ProductNotFound(_)
            | OrdersServiceError::ProductUnavailable(_)
            | OrdersServiceError::InsufficientStock { .. }
            | OrdersServiceError::InvalidTransition { .. }
            | OrdersServiceError::PaymentOnCancelled
            | OrdersServiceError::PriceOverflow => Self::bad_request(error.to_string()),
            OrdersServiceError::OutOfRange(_) => Self::bad_request("Numeric value out of range"),
            OrdersServiceError::Catalog(source) => Self::from(source),
            OrdersServiceError::Sql(source) => {
                error!("orders storage error: {source}");

                Self::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use storefront_app::domain::{orders::status::OrderStatus, products::records::ProductUuid};

    use super::*;

    #[test]
    fn stock_shortfalls_name_what_is_left() {
        let error = ApiError::from(OrdersServiceError::InsufficientStock {
            title: "Coat".to_string(),
            available: 2,
        });

        assert_eq!(error.code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.message(), "Insufficient stock for Coat. Available: 2");
    }

    #[test]
    fn foreign_orders_are_unauthorized() {
        let error = ApiError::from(OrdersServiceError::Unauthorized);

        assert_eq!(error.code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn backward_transitions_are_bad_requests() {
        let error = ApiError::from(OrdersServiceError::InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Pending,
        });

        assert_eq!(error.code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_checkout_products_are_bad_requests() {
        let product = ProductUuid::new();
        let error = ApiError::from(OrdersServiceError::ProductNotFound(product));

        assert_eq!(error.code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error.message(),
            format!("Product {product} not found or unavailable")
        );
    }

    #[test]
    fn missing_orders_are_not_found() {
        let error = ApiError::from(OrdersServiceError::NotFound);

        assert_eq!(error.code(), StatusCode::NOT_FOUND);
        assert_eq!(error.message(), "Order not found");
    }
}
