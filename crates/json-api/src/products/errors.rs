//! Product Errors

use tracing::error;

use storefront_app::domain::products::ProductsServiceError;

use crate::errors::ApiError;

impl From<ProductsServiceError> for ApiError {
    fn from(error: ProductsServiceError) -> Self {
        match error {
            ProductsServiceError::AlreadyExists => Self::conflict("Product already exists"),
            ProductsServiceError::NotFound => Self::not_found("Product not found"),
            ProductsServiceError::Unauthorized => {
                Self::unauthorized("Not authorized to manage products")
            }
            ProductsServiceError::Invalid(message) => Self::bad_request(message),
            ProductsServiceError::MissingRequiredData | ProductsServiceError::InvalidData => {
                Self::bad_request("Invalid product payload")
            }
            ProductsServiceError::OutOfRange(_) => Self::bad_request("Numeric value out of range"),
            ProductsServiceError::Sql(source) => {
                error!("products storage error: {source}");

                Self::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn validation_messages_reach_the_caller() {
        let error = ApiError::from(ProductsServiceError::Invalid("image is required"));

        assert_eq!(error.code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.message(), "image is required");
    }

    #[test]
    fn duplicates_conflict() {
        let error = ApiError::from(ProductsServiceError::AlreadyExists);

        assert_eq!(error.code(), StatusCode::CONFLICT);
    }

    #[test]
    fn non_admins_are_unauthorized() {
        let error = ApiError::from(ProductsServiceError::Unauthorized);

        assert_eq!(error.code(), StatusCode::UNAUTHORIZED);
    }
}
