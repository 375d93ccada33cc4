//! Merge Guest Cart Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::carts::data::{CartMerge, GuestCartLine};

use crate::{
    carts::get::CartResponse, errors::ApiError, extensions::*, response::ApiResponse,
    state::State,
};

/// Merge Guest Cart Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MergeCartRequest {
    /// Lines collected before the caller signed in
    pub items: Vec<GuestCartItem>,
}

/// A line from a guest cart
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GuestCartItem {
    pub product_id: Uuid,
    pub amount: i64,
}

impl From<GuestCartItem> for GuestCartLine {
    fn from(item: GuestCartItem) -> Self {
        GuestCartLine {
            product_uuid: item.product_id.into(),
            quantity: item.amount,
        }
    }
}

/// Merge Guest Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct MergeCartResponse {
    /// The caller's cart after the merge
    pub cart: CartResponse,

    /// Guest lines dropped because the product is missing or inactive
    pub skipped: Vec<Uuid>,
}

impl From<CartMerge> for MergeCartResponse {
    fn from(merge: CartMerge) -> Self {
        MergeCartResponse {
            cart: merge.cart.into(),
            skipped: merge.skipped.into_iter().map(Uuid::from).collect(),
        }
    }
}

/// Merge Guest Cart Handler
///
/// Folds a guest cart into the caller's cart, summing quantities for products
/// already present.
#[endpoint(
    tags("cart"),
    summary = "Merge Guest Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Merged cart"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<MergeCartRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiResponse<MergeCartResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let lines = json
        .into_inner()
        .items
        .into_iter()
        .map(GuestCartLine::from)
        .collect();

    let merge = state.app.carts.merge_guest_cart(identity, lines).await?;

    if !merge.skipped.is_empty() {
        tracing::info!(
            user_uuid = %identity.user,
            skipped = merge.skipped.len(),
            "skipped unavailable guest cart lines"
        );
    }

    Ok(ApiResponse::success(merge.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::{
        carts::{CartsServiceError, MockCartsService},
        products::records::ProductUuid,
    };

    use crate::test_helpers::{carts_service, make_cart};

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/merge").post(handler))
    }

    #[tokio::test]
    async fn test_merge_reports_skipped_lines() -> TestResult {
        let kept = ProductUuid::new();
        let gone = ProductUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_merge_guest_cart()
            .once()
            .withf(move |_, lines| {
                *lines
                    == vec![
                        GuestCartLine {
                            product_uuid: kept,
                            quantity: 2,
                        },
                        GuestCartLine {
                            product_uuid: gone,
                            quantity: 1,
                        },
                    ]
            })
            .return_once(move |identity, _| {
                Ok(CartMerge {
                    cart: make_cart(identity.user, &[(kept, 2)]),
                    skipped: vec![gone],
                })
            });

        let mut res = TestClient::post("http://example.com/cart/merge")
            .json(&json!({
                "items": [
                    { "productId": kept.into_uuid(), "amount": 2 },
                    { "productId": gone.into_uuid(), "amount": 1 }
                ]
            }))
            .send(&make_service(carts))
            .await;

        let body: ApiResponse<MergeCartResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.cart.item_count, 2);
        assert_eq!(body.data.skipped, vec![gone.into_uuid()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_with_invalid_amount_returns_400() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_merge_guest_cart()
            .once()
            .return_once(|_, _| Err(CartsServiceError::InvalidQuantity));

        let res = TestClient::post("http://example.com/cart/merge")
            .json(&json!({ "items": [{ "productId": Uuid::now_v7(), "amount": 0 }] }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
