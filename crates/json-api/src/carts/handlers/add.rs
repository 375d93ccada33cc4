//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    carts::get::CartResponse, errors::ApiError, extensions::*, response::ApiResponse,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddCartItemRequest {
    /// The product to add
    pub product_id: Uuid,

    /// How many units to add, at least 1
    #[serde(default = "one")]
    pub amount: i64,
}

const fn one() -> i64 {
    1
}

/// Add Cart Item Handler
///
/// Adds units of an active product, merging with an existing line.
#[endpoint(
    tags("cart"),
    summary = "Add Item To Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
    ),
)]
#[tracing::instrument(
    name = "cart.add",
    skip(json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
        amount = tracing::field::Empty,
    ),
    err(Debug)
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(identity.user));
    span.record("product_uuid", tracing::field::display(request.product_id));
    span.record("amount", request.amount);

    let cart = state
        .app
        .carts
        .add_item(identity, request.product_id.into(), request.amount)
        .await?;

    Ok(ApiResponse::success(cart.into()))
}
