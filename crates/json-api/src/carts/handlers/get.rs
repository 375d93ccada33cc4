//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::carts::records::{CartItemRecord, CartRecord};

use crate::{errors::ApiError, extensions::*, response::ApiResponse, state::State};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The owning user
    pub owner: Uuid,

    /// The lines in the cart, in the order they were first added
    pub items: Vec<CartItemResponse>,

    /// Sum of price times quantity over every line, in cents
    pub total: u64,

    /// Sum of quantities over every line
    pub item_count: u64,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        CartResponse {
            uuid: cart.uuid.into(),
            owner: cart.owner.into(),
            items: cart.items().iter().map(CartItemResponse::from).collect(),
            total: cart.total(),
            item_count: cart.item_count(),
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemResponse {
    /// The product this line refers to
    pub product_id: Uuid,

    /// Product title when the line was added
    pub title: String,

    /// Unit price when the line was added, in cents
    pub price: u64,

    pub quantity: u32,

    pub image: String,
}

impl From<&CartItemRecord> for CartItemResponse {
    fn from(item: &CartItemRecord) -> Self {
        CartItemResponse {
            product_id: item.product_uuid.into(),
            title: item.title.clone(),
            price: item.price,
            quantity: item.quantity,
            image: item.image.clone(),
        }
    }
}

/// Get Cart Handler
///
/// Returns the caller's cart, creating an empty one on first access.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The caller's cart"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ApiResponse<CartResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let cart = state.app.carts.get_cart(identity).await?;

    Ok(ApiResponse::success(cart.into()))
}
