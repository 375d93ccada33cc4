//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::get::CartResponse, errors::ApiError, extensions::*, response::ApiResponse,
    state::State,
};

/// Remove Cart Item Handler
///
/// Drops a line from the cart. Removing a product that is not in the cart
/// leaves the cart unchanged.
#[endpoint(
    tags("cart"),
    summary = "Remove Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
    ),
)]
pub(crate) async fn handler(
    product_id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let cart = state
        .app
        .carts
        .remove_item(identity, product_id.into_inner().into())
        .await?;

    Ok(ApiResponse::success(cart.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use storefront_app::domain::{
        carts::{CartsServiceError, MockCartsService},
        products::records::ProductUuid,
    };

    use crate::test_helpers::{carts_service, make_cart};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/remove/{product_id}").delete(handler))
    }

    #[tokio::test]
    async fn test_remove_item_returns_remaining_lines() -> TestResult {
        let removed = ProductUuid::new();
        let kept = ProductUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_remove_item()
            .once()
            .withf(move |_, p| *p == removed)
            .return_once(move |identity, _| Ok(make_cart(identity.user, &[(kept, 2)])));

        let mut res = TestClient::delete(format!("http://example.com/cart/remove/{removed}"))
            .send(&make_service(carts))
            .await;

        let body: ApiResponse<CartResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.items.len(), 1);
        assert_eq!(body.data.items[0].product_id, kept.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_without_cart_returns_404() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_remove_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/cart/remove/{}", Uuid::now_v7()))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
