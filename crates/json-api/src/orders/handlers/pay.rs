//! Pay Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::orders::data::PaymentUpdate;

use crate::{
    errors::ApiError, extensions::*, orders::get::OrderResponse, response::ApiResponse,
    state::State,
};

/// Pay Order Request
///
/// Every field is optional, and the body itself may be omitted to record a
/// manual payment.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct PayOrderRequest {
    /// Payment provider reference, `manual` when absent
    pub id: Option<String>,
    /// Provider status, `completed` when absent
    pub status: Option<String>,
    /// Payer email
    pub email_address: Option<String>,
}

impl PayOrderRequest {
    /// Parse the request body, treating an empty body as `{}`.
    fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.trim_ascii().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|error| ApiError::bad_request(format!("Invalid payment details: {error}")))
    }
}

impl From<PayOrderRequest> for PaymentUpdate {
    fn from(request: PayOrderRequest) -> Self {
        PaymentUpdate {
            id: request.id,
            status: request.status,
            email_address: request.email_address,
        }
    }
}

/// Pay Order Handler
///
/// Marks an order paid. Paying twice keeps the first payment.
#[endpoint(
    tags("orders"),
    summary = "Pay Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order paid"),
    ),
)]
pub(crate) async fn handler(
    id: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let body = req
        .payload()
        .await
        .map_err(|error| ApiError::bad_request(format!("Invalid payment details: {error}")))?;

    let payment = PayOrderRequest::from_body(body)?;

    let order = state
        .app
        .orders
        .mark_paid(identity, id.into_inner().into(), payment.into())
        .await?;

    tracing::info!(order_uuid = %order.uuid, user_uuid = %identity.user, "order paid");

    Ok(ApiResponse::success(order.into()))
}
