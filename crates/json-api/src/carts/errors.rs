//! Cart Errors

use tracing::error;

use storefront_app::domain::carts::CartsServiceError;

use crate::errors::ApiError;

impl From<CartsServiceError> for ApiError {
    fn from(error: CartsServiceError) -> Self {
        match error {
            CartsServiceError::NotFound
            | CartsServiceError::ItemNotFound
            | CartsServiceError::ProductNotFound => Self::not_found(error.to_string()),
            CartsServiceError::InvalidQuantity | CartsServiceError::QuantityOverflow => {
                Self::bad_request(error.to_string())
            }
            CartsServiceError::OutOfRange(_) => Self::bad_request("Numeric value out of range"),
            CartsServiceError::Catalog(source) => Self::from(source),
            CartsServiceError::Sql(source) => {
                error!("carts storage error: {source}");

                Self::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use storefront_app::domain::products::ProductsServiceError;

    use super::*;

    #[test]
    fn missing_lines_are_not_found() {
        let error = ApiError::from(CartsServiceError::ItemNotFound);

        assert_eq!(error.code(), StatusCode::NOT_FOUND);
        assert_eq!(error.message(), "Item not found in cart");
    }

    #[test]
    fn bad_amounts_are_rejected() {
        let error = ApiError::from(CartsServiceError::InvalidQuantity);

        assert_eq!(error.code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.message(), "Amount must be at least 1");
    }

    #[test]
    fn catalog_errors_keep_their_status() {
        let error = ApiError::from(CartsServiceError::Catalog(ProductsServiceError::Unauthorized));

        assert_eq!(error.code(), StatusCode::UNAUTHORIZED);
    }
}
