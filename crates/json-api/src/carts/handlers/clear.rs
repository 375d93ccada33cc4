//! Clear Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::get::CartResponse, errors::ApiError, extensions::*, response::ApiResponse,
    state::State,
};

/// Clear Cart Handler
#[endpoint(
    tags("cart"),
    summary = "Clear Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Emptied cart"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let cart = state.app.carts.clear_cart(identity).await?;

    Ok(ApiResponse::success(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::carts::{CartsServiceError, MockCartsService};

    use crate::test_helpers::{TEST_CUSTOMER, carts_service, make_cart};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/clear").delete(handler))
    }

    #[tokio::test]
    async fn test_clear_cart_returns_empty_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_clear_cart()
            .once()
            .withf(|identity| *identity == TEST_CUSTOMER)
            .return_once(|identity| Ok(make_cart(identity.user, &[])));

        let mut res = TestClient::delete("http://example.com/cart/clear")
            .send(&make_service(carts))
            .await;

        let body: ApiResponse<CartResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.data.items.is_empty(), "expected no lines after clearing");
        assert_eq!(body.data.total, 0);
        assert_eq!(body.data.item_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_without_cart_returns_404() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_clear_cart()
            .once()
            .return_once(|_| Err(CartsServiceError::NotFound));

        let res = TestClient::delete("http://example.com/cart/clear")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
