//! Get Order Handler

use std::{string::ToString, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::orders::records::{
    OrderItemRecord, OrderRecord, PaymentResult, ShippingAddress,
};

use crate::{errors::ApiError, extensions::*, response::ApiResponse, state::State};

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    /// The unique identifier of the order
    pub uuid: Uuid,

    /// The user who placed the order
    pub owner: Uuid,

    /// Lines priced at checkout
    pub items: Vec<OrderItemResponse>,

    pub shipping_address: ShippingAddressData,

    /// One of `credit_card`, `paypal`, `stripe`, `cash_on_delivery`
    pub payment_method: String,

    pub notes: Option<String>,

    /// Sum of line totals, in cents
    pub items_price: u64,

    /// Tax on the items price, in cents
    pub tax_price: u64,

    /// Shipping charge, in cents
    pub shipping_price: u64,

    /// Items, tax and shipping together, in cents
    pub total_price: u64,

    /// One of `pending`, `processing`, `shipped`, `delivered`, `cancelled`
    pub status: String,

    pub is_paid: bool,

    pub paid_at: Option<String>,

    pub payment_result: Option<PaymentResultResponse>,

    pub is_delivered: bool,

    pub delivered_at: Option<String>,

    pub tracking_number: Option<String>,

    /// The date and time the order was placed
    pub created_at: String,

    /// The date and time the order was last updated
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        OrderResponse {
            uuid: order.uuid.into(),
            owner: order.owner.into(),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            shipping_address: order.shipping_address.into(),
            payment_method: order.payment_method.to_string(),
            notes: order.notes,
            items_price: order.items_price,
            tax_price: order.tax_price,
            shipping_price: order.shipping_price,
            total_price: order.total_price,
            status: order.status.to_string(),
            is_paid: order.is_paid,
            paid_at: order.paid_at.as_ref().map(ToString::to_string),
            payment_result: order.payment_result.map(PaymentResultResponse::from),
            is_delivered: order.is_delivered,
            delivered_at: order.delivered_at.as_ref().map(ToString::to_string),
            tracking_number: order.tracking_number,
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        }
    }
}

/// Order Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemResponse {
    pub product_id: Uuid,
    pub title: String,
    /// Unit price at checkout, in cents
    pub price: u64,
    pub quantity: u32,
    pub image: String,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        OrderItemResponse {
            product_id: item.product_uuid.into(),
            title: item.title,
            price: item.price,
            quantity: item.quantity,
            image: item.image,
        }
    }
}

/// Shipping Address
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ShippingAddressData {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
}

impl From<ShippingAddress> for ShippingAddressData {
    fn from(address: ShippingAddress) -> Self {
        ShippingAddressData {
            first_name: address.first_name,
            last_name: address.last_name,
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            country: address.country,
            phone: address.phone,
        }
    }
}

/// Payment Result
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentResultResponse {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: Option<String>,
}

impl From<PaymentResult> for PaymentResultResponse {
    fn from(payment: PaymentResult) -> Self {
        PaymentResultResponse {
            id: payment.id,
            status: payment.status,
            update_time: payment.update_time.to_string(),
            email_address: payment.email_address,
        }
    }
}

/// Get Order Handler
///
/// Returns an order to its owner or an admin.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
    ),
)]
pub(crate) async fn handler(
    id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let order = state
        .app
        .orders
        .get_order(identity, id.into_inner().into())
        .await?;

    Ok(ApiResponse::success(order.into()))
}
