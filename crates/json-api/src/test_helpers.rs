//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use storefront_app::{
    auth::{Identity, MockAuthService, UserUuid},
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            records::{CartItemRecord, CartRecord},
        },
        orders::{
            MockOrdersService,
            records::{OrderItemRecord, OrderRecord, OrderUuid, PaymentMethod, ShippingAddress},
            status::OrderStatus,
        },
        products::{
            MockProductsService,
            records::{Category, ProductRecord, ProductUuid},
        },
    },
};

use crate::{errors, extensions::*, state::State};

pub(crate) const TEST_CUSTOMER: Identity =
    Identity::customer(UserUuid::from_uuid(Uuid::from_u128(1)));

pub(crate) const TEST_ADMIN: Identity = Identity::admin(UserUuid::from_uuid(Uuid::from_u128(2)));

/// Mocks for every service, each refusing any call unless a test says otherwise.
#[derive(Debug)]
pub(crate) struct Mocks {
    pub(crate) products: MockProductsService,
    pub(crate) carts: MockCartsService,
    pub(crate) orders: MockOrdersService,
    pub(crate) auth: MockAuthService,
}

impl Default for Mocks {
    fn default() -> Self {
        let mut products = MockProductsService::new();

        products.expect_list_products().never();
        products.expect_get_product().never();
        products.expect_create_product().never();
        products.expect_update_product().never();
        products.expect_deactivate_product().never();

        let mut carts = MockCartsService::new();

        carts.expect_get_cart().never();
        carts.expect_add_item().never();
        carts.expect_update_item().never();
        carts.expect_remove_item().never();
        carts.expect_clear_cart().never();
        carts.expect_merge_guest_cart().never();

        let mut orders = MockOrdersService::new();

        orders.expect_place_order().never();
        orders.expect_get_order().never();
        orders.expect_list_my_orders().never();
        orders.expect_list_orders().never();
        orders.expect_mark_paid().never();
        orders.expect_update_status().never();

        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer().never();

        Self {
            products,
            carts,
            orders,
            auth,
        }
    }
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            auth: Arc::new(self.auth),
        })
    }

    /// Serve `route` as `identity`, skipping bearer authentication.
    pub(crate) fn service_as(self, identity: Identity, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(self.into_state()))
                .hoop(InjectIdentity(identity))
                .push(route),
        )
        .catcher(errors::catcher())
    }

    /// Serve `route` without any caller identity.
    pub(crate) fn anonymous_service(self, route: Router) -> Service {
        Service::new(Router::new().hoop(inject(self.into_state())).push(route))
            .catcher(errors::catcher())
    }
}

struct InjectIdentity(Identity);

#[async_trait]
impl Handler for InjectIdentity {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        depot.insert_identity(self.0);
        ctrl.call_next(req, depot, res).await;
    }
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    Mocks {
        auth,
        ..Mocks::default()
    }
    .into_state()
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    Mocks {
        products,
        ..Mocks::default()
    }
    .service_as(TEST_ADMIN, route)
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    Mocks {
        carts,
        ..Mocks::default()
    }
    .service_as(TEST_CUSTOMER, route)
}

pub(crate) fn orders_service(orders: MockOrdersService, identity: Identity, route: Router) -> Service {
    Mocks {
        orders,
        ..Mocks::default()
    }
    .service_as(identity, route)
}

pub(crate) fn make_product(uuid: ProductUuid) -> ProductRecord {
    ProductRecord {
        uuid,
        title: "Backpack".to_string(),
        description: "Fits a 15 inch laptop".to_string(),
        price: 10_995,
        category: Category::MensClothing,
        image: "https://example.com/backpack.png".to_string(),
        stock: 120,
        discount: 0,
        is_active: true,
        featured: false,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_cart(owner: UserUuid, lines: &[(ProductUuid, u32)]) -> CartRecord {
    let items = lines
        .iter()
        .map(|(product, quantity)| CartItemRecord {
            product_uuid: *product,
            title: "Backpack".to_string(),
            price: 1_000,
            quantity: *quantity,
            image: "https://example.com/backpack.png".to_string(),
        })
        .collect();

    CartRecord::from_parts(
        Uuid::from_u128(10).into(),
        owner,
        items,
        Timestamp::UNIX_EPOCH,
        Timestamp::UNIX_EPOCH,
    )
}

pub(crate) fn make_order(uuid: OrderUuid, owner: UserUuid) -> OrderRecord {
    OrderRecord {
        uuid,
        owner,
        items: vec![OrderItemRecord {
            product_uuid: Uuid::from_u128(20).into(),
            title: "Coat".to_string(),
            price: 1_800,
            quantity: 3,
            image: "https://example.com/coat.png".to_string(),
        }],
        shipping_address: ShippingAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            street: "12 St James's Square".to_string(),
            city: "London".to_string(),
            state: "Greater London".to_string(),
            zip_code: "SW1Y 4JH".to_string(),
            country: "United Kingdom".to_string(),
            phone: "+44 20 7946 0000".to_string(),
        },
        payment_method: PaymentMethod::CreditCard,
        notes: None,
        items_price: 5_400,
        tax_price: 540,
        shipping_price: 1_000,
        total_price: 6_940,
        status: OrderStatus::Pending,
        is_paid: false,
        paid_at: None,
        payment_result: None,
        is_delivered: false,
        delivered_at: None,
        tracking_number: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
