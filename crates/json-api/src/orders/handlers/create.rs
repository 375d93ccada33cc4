//! Create Order Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use storefront_app::domain::{
    carts::CartsServiceError,
    orders::{
        OrdersServiceError,
        validation::{ProposedOrder, ProposedOrderItem, ProposedShippingAddress},
    },
};

use crate::{
    errors::ApiError,
    extensions::*,
    observability::{CheckoutOutcome, observe_checkout},
    orders::get::{OrderResponse, ShippingAddressData},
    response::ApiResponse,
    state::State,
};

/// Create Order Request
///
/// Shape and content are checked by checkout, so missing fields surface as
/// validation messages rather than parse failures.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CreateOrderRequest {
    pub order_items: Vec<OrderItemRequest>,
    pub shipping_address: ShippingAddressData,
    /// One of `credit_card`, `paypal`, `stripe`, `cash_on_delivery`
    pub payment_method: String,
    pub notes: Option<String>,
}

/// A requested order line
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub(crate) struct OrderItemRequest {
    /// Product identifier
    pub product: String,
    /// Units to buy, at least 1
    pub quantity: i64,
}

impl From<CreateOrderRequest> for ProposedOrder {
    fn from(request: CreateOrderRequest) -> Self {
        let address = request.shipping_address;

        ProposedOrder {
            items: request
                .order_items
                .into_iter()
                .map(|item| ProposedOrderItem {
                    product: item.product,
                    quantity: item.quantity,
                })
                .collect(),
            shipping_address: ProposedShippingAddress {
                first_name: address.first_name,
                last_name: address.last_name,
                street: address.street,
                city: address.city,
                state: address.state,
                zip_code: address.zip_code,
                country: address.country,
                phone: address.phone,
            },
            payment_method: request.payment_method,
            notes: request.notes,
        }
    }
}

/// Create Order Handler
///
/// Places an order for the caller, taking stock for every line at once. The
/// caller's cart is emptied afterwards.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(json, depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        lines = tracing::field::Empty,
    ),
    err(Debug)
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(identity.user));
    span.record("lines", request.order_items.len());

    let order = match state.app.orders.place_order(identity, request.into()).await {
        Ok(order) => order,
        Err(error) => {
            if matches!(error, OrdersServiceError::InsufficientStock { .. }) {
                observe_checkout(CheckoutOutcome::StockConflict);
            }

            return Err(error.into());
        }
    };

    observe_checkout(CheckoutOutcome::Placed);

    match state.app.carts.clear_cart(identity).await {
        Ok(_) => {}
        Err(CartsServiceError::NotFound) => debug!("no cart to clear after checkout"),
        Err(error) => warn!(order_uuid = %order.uuid, "failed to clear cart after checkout: {error}"),
    }

    res.add_header(LOCATION, format!("/api/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(ApiResponse::success(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use storefront_app::domain::{
        carts::MockCartsService,
        orders::{MockOrdersService, records::OrderUuid},
        products::records::ProductUuid,
    };

    use crate::{
        errors::ErrorResponse,
        test_helpers::{Mocks, TEST_CUSTOMER, make_cart, make_order},
    };

    use super::*;

    fn make_service(orders: MockOrdersService, carts: MockCartsService) -> Service {
        Mocks {
            orders,
            carts,
            ..Mocks::default()
        }
        .service_as(TEST_CUSTOMER, Router::with_path("orders").post(handler))
    }

    fn order_json(product: ProductUuid, quantity: i64) -> Value {
        json!({
            "orderItems": [{ "product": product.to_string(), "quantity": quantity }],
            "shippingAddress": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "street": "12 St James's Square",
                "city": "London",
                "state": "Greater London",
                "zipCode": "SW1Y 4JH",
                "country": "United Kingdom",
                "phone": "+44 20 7946 0000"
            },
            "paymentMethod": "credit_card",
            "notes": "Leave with the porter"
        })
    }

    #[tokio::test]
    async fn test_create_order_clears_the_cart() -> TestResult {
        let product = ProductUuid::new();
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .withf(move |identity, order| {
                *identity == TEST_CUSTOMER
                    && order.items
                        == vec![ProposedOrderItem {
                            product: product.to_string(),
                            quantity: 3,
                        }]
                    && order.shipping_address.city == "London"
                    && order.payment_method == "credit_card"
                    && order.notes.as_deref() == Some("Leave with the porter")
            })
            .return_once(move |identity, _| Ok(make_order(uuid, identity.user)));

        let mut carts = MockCartsService::new();

        carts
            .expect_clear_cart()
            .once()
            .withf(|identity| *identity == TEST_CUSTOMER)
            .return_once(|identity| Ok(make_cart(identity.user, &[])));

        let mut res = TestClient::post("http://example.com/orders")
            .json(&order_json(product, 3))
            .send(&make_service(orders, carts))
            .await;

        let body: ApiResponse<OrderResponse> = res.take_json().await?;
        let location = res
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/api/orders/{uuid}")));
        assert_eq!(body.data.total_price, 6_940);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_succeeds_when_cart_clear_fails() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .return_once(|identity, _| Ok(make_order(OrderUuid::new(), identity.user)));

        let mut carts = MockCartsService::new();

        carts
            .expect_clear_cart()
            .once()
            .return_once(|_| Err(CartsServiceError::NotFound));

        let res = TestClient::post("http://example.com/orders")
            .json(&order_json(ProductUuid::new(), 1))
            .send(&make_service(orders, carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_stock_returns_400_and_keeps_cart() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders.expect_place_order().once().return_once(|_, _| {
            Err(OrdersServiceError::InsufficientStock {
                title: "Coat".to_string(),
                available: 2,
            })
        });

        let mut carts = MockCartsService::new();

        carts.expect_clear_cart().never();

        let mut res = TestClient::post("http://example.com/orders")
            .json(&order_json(ProductUuid::new(), 3))
            .send(&make_service(orders, carts))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.message, "Insufficient stock for Coat. Available: 2");

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_order_returns_validation_message() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .withf(|_, order| order.items.is_empty())
            .return_once(|_, _| Err(OrdersServiceError::Invalid("No order items".to_string())));

        let mut carts = MockCartsService::new();

        carts.expect_clear_cart().never();

        let mut res = TestClient::post("http://example.com/orders")
            .json(&json!({ "paymentMethod": "paypal" }))
            .send(&make_service(orders, carts))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.message, "No order items");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_product_returns_400() -> TestResult {
        let product = ProductUuid::new();
        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .return_once(move |_, _| Err(OrdersServiceError::ProductNotFound(product)));

        let mut carts = MockCartsService::new();

        carts.expect_clear_cart().never();

        let mut res = TestClient::post("http://example.com/orders")
            .json(&order_json(product, 1))
            .send(&make_service(orders, carts))
            .await;

        let body: ErrorResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            body.message,
            format!("Product {product} not found or unavailable")
        );

        Ok(())
    }
}
