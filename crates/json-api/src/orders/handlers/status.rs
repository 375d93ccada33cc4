//! Update Order Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::orders::data::StatusUpdate;

use crate::{
    errors::ApiError, extensions::*, orders::get::OrderResponse, response::ApiResponse,
    state::State,
};

/// Update Order Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateOrderStatusRequest {
    /// One of `pending`, `processing`, `shipped`, `delivered`, `cancelled`
    pub status: String,

    /// Carrier tracking number
    #[serde(default)]
    pub tracking_number: Option<String>,
}

impl From<UpdateOrderStatusRequest> for StatusUpdate {
    fn from(request: UpdateOrderStatusRequest) -> Self {
        StatusUpdate {
            status: request.status,
            tracking_number: request.tracking_number,
        }
    }
}

/// Update Order Status Handler
///
/// Moves an order along its fulfilment states. Admin only.
#[endpoint(
    tags("orders"),
    summary = "Update Order Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order updated"),
    ),
)]
#[tracing::instrument(
    name = "orders.status",
    skip(id, json, depot),
    fields(order_uuid = tracing::field::Empty, status = tracing::field::Empty),
    err(Debug)
)]
pub(crate) async fn handler(
    id: PathParam<Uuid>,
    json: JsonBody<UpdateOrderStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;
    let id = id.into_inner();
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(id));
    span.record("status", request.status.as_str());

    let order = state
        .app
        .orders
        .update_status(identity, id.into(), request.into())
        .await?;

    Ok(ApiResponse::success(order.into()))
}
