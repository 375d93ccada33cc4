//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::{
    auth::{AuthRepository, AuthServiceError, Identity},
    domain::{
        orders::{
            data::{NewOrder, PaymentUpdate, StatusUpdate},
            errors::OrdersServiceError,
            pricing::PricingPolicy,
            records::{OrderItemRecord, OrderRecord, OrderUuid},
            repository::OrdersRepository,
            status::OrderStatus,
            validation::{ProposedOrder, ValidatedOrder},
        },
        products::{
            records::{ProductRecord, ProductUuid},
            repository::ProductsRepository,
        },
    },
    pagination::{Page, Paginated},
};

#[derive(Clone)]
pub struct DefaultOrdersService {
    orders: Arc<dyn OrdersRepository>,
    products: Arc<dyn ProductsRepository>,
    users: Arc<dyn AuthRepository>,
    pricing: PricingPolicy,
}

impl DefaultOrdersService {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersRepository>,
        products: Arc<dyn ProductsRepository>,
        users: Arc<dyn AuthRepository>,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            orders,
            products,
            users,
            pricing,
        }
    }

    /// Use the payer's account email when the payment carries none.
    async fn with_payer_email(
        &self,
        payer: Identity,
        mut payment: PaymentUpdate,
    ) -> PaymentUpdate {
        if payment.has_email() {
            return payment;
        }

        match self.users.get_user(payer.user).await {
            Ok(user) => payment.email_address = Some(user.email),
            Err(AuthServiceError::UserNotFound) => {}
            Err(source) => warn!(user = %payer.user, "failed to look up payer email: {source}"),
        }

        payment
    }

    /// Check every line against the catalog in the order given and price it.
    ///
    /// Repeated lines for one product are checked against their combined
    /// quantity.
    async fn price_lines(
        &self,
        order: &ValidatedOrder,
    ) -> Result<Vec<OrderItemRecord>, OrdersServiceError> {
        let mut uuids: Vec<ProductUuid> = order.items.iter().map(|item| item.product_uuid).collect();
        uuids.sort_unstable();
        uuids.dedup();

        let catalog: FxHashMap<ProductUuid, ProductRecord> = self
            .products
            .get_products(&uuids)
            .await?
            .into_iter()
            .map(|product| (product.uuid, product))
            .collect();

        let mut requested: FxHashMap<ProductUuid, u64> = FxHashMap::default();
        let mut lines = Vec::with_capacity(order.items.len());

        for item in &order.items {
            let product = catalog
                .get(&item.product_uuid)
                .ok_or(OrdersServiceError::ProductNotFound(item.product_uuid))?;

            if !product.is_active {
                return Err(OrdersServiceError::ProductUnavailable(product.uuid));
            }

            let total = requested.entry(product.uuid).or_default();
            *total += u64::from(item.quantity);

            if u64::from(product.stock) < *total {
                return Err(OrdersServiceError::InsufficientStock {
                    title: product.title.clone(),
                    available: product.stock,
                });
            }

            lines.push(OrderItemRecord {
                product_uuid: product.uuid,
                title: product.title.clone(),
                price: product.discounted_price(),
                quantity: item.quantity,
                image: product.image.clone(),
            });
        }

        Ok(lines)
    }
}

fn require_admin(identity: Identity) -> Result<(), OrdersServiceError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(OrdersServiceError::Unauthorized)
    }
}

#[async_trait]
impl OrdersService for DefaultOrdersService {
    async fn place_order(
        &self,
        identity: Identity,
        order: ProposedOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let order = order.validate()?;
        let items = self.price_lines(&order).await?;

        let items_price = items.iter().try_fold(0_u64, |sum, item| {
            item.line_total()
                .and_then(|line| sum.checked_add(line))
                .ok_or(OrdersServiceError::PriceOverflow)
        })?;

        let pricing = self.pricing.price(items_price)?;

        let new_order = NewOrder {
            uuid: OrderUuid::new(),
            owner: identity.user,
            items,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            notes: order.notes,
            pricing,
        };

        let created = match self.orders.create_order(new_order).await {
            Ok(created) => created,
            Err(error @ OrdersServiceError::InsufficientStock { .. }) => {
                warn!(user = %identity.user, error = %error, "stock taken by a concurrent order");
                return Err(error);
            }
            Err(error) => return Err(error),
        };

        info!(
            order = %created.uuid,
            user = %created.owner,
            total_price = created.total_price,
            "order placed"
        );

        Ok(created)
    }

    async fn get_order(
        &self,
        identity: Identity,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let record = self.orders.get_order(order).await?;

        if !identity.can_access(record.owner) {
            return Err(OrdersServiceError::Unauthorized);
        }

        Ok(record)
    }

    async fn list_my_orders(
        &self,
        identity: Identity,
        page: Page,
    ) -> Result<Paginated<OrderRecord>, OrdersServiceError> {
        self.orders.list_orders(Some(identity.user), page).await
    }

    async fn list_orders(
        &self,
        identity: Identity,
        page: Page,
    ) -> Result<Paginated<OrderRecord>, OrdersServiceError> {
        require_admin(identity)?;

        self.orders.list_orders(None, page).await
    }

    async fn mark_paid(
        &self,
        identity: Identity,
        order: OrderUuid,
        payment: PaymentUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let payment = self.with_payer_email(identity, payment).await;

        let updated = self
            .orders
            .update_order(
                order,
                Box::new(move |record: &mut OrderRecord| {
                    if !identity.can_access(record.owner) {
                        return Err(OrdersServiceError::Unauthorized);
                    }

                    let now = Timestamp::now();

                    record.mark_paid(payment.into_result(now), now)
                }),
            )
            .await?;

        info!(order = %updated.uuid, "order marked paid");

        Ok(updated)
    }

    async fn update_status(
        &self,
        identity: Identity,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError> {
        require_admin(identity)?;

        let status: OrderStatus = update.status.trim().parse()?;

        let tracking_number = update
            .tracking_number
            .map(|tracking| tracking.trim().to_string())
            .filter(|tracking| !tracking.is_empty());

        let updated = self
            .orders
            .update_order(
                order,
                Box::new(move |record: &mut OrderRecord| {
                    record.apply_status(status, tracking_number, Timestamp::now())
                }),
            )
            .await?;

        info!(order = %updated.uuid, status = %updated.status, "order status updated");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Validate, price and commit an order for the caller.
    ///
    /// Stock for every line is taken atomically. The caller's cart is left
    /// untouched.
    async fn place_order(
        &self,
        identity: Identity,
        order: ProposedOrder,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// A single order visible to its owner or an admin.
    async fn get_order(
        &self,
        identity: Identity,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// The caller's own orders, newest first.
    async fn list_my_orders(
        &self,
        identity: Identity,
        page: Page,
    ) -> Result<Paginated<OrderRecord>, OrdersServiceError>;

    /// Every order, newest first. Admin only.
    async fn list_orders(
        &self,
        identity: Identity,
        page: Page,
    ) -> Result<Paginated<OrderRecord>, OrdersServiceError>;

    /// Record payment. Owner or admin only; repeat calls keep the first payment.
    async fn mark_paid(
        &self,
        identity: Identity,
        order: OrderUuid,
        payment: PaymentUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Move an order along its fulfilment states. Admin only.
    async fn update_status(
        &self,
        identity: Identity,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
