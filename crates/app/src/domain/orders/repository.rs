//! Orders Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::{
        orders::{
            data::NewOrder,
            errors::OrdersServiceError,
            records::{
                OrderItemRecord, OrderRecord, OrderUuid, PaymentResult, ShippingAddress,
            },
            status::OrderStatus,
        },
        products::records::ProductUuid,
    },
    pagination::{Page, Paginated},
};

const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");
const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("sql/count_orders.sql");
const UPDATE_ORDER_SQL: &str = include_str!("sql/update_order.sql");

/// A change applied to an order while it is locked.
///
/// Returning an error discards the change.
pub type OrderMutation =
    Box<dyn FnOnce(&mut OrderRecord) -> Result<(), OrdersServiceError> + Send>;

/// Order persistence.
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Take stock for every line and store the order, all or nothing.
    ///
    /// Fails with [`OrdersServiceError::InsufficientStock`] when any product
    /// no longer has enough stock; no stock is taken in that case.
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Orders newest first, limited to `owner` when given.
    async fn list_orders(
        &self,
        owner: Option<UserUuid>,
        page: Page,
    ) -> Result<Paginated<OrderRecord>, OrdersServiceError>;

    /// Apply `mutation` to the order and persist its status and payment fields.
    async fn update_order(
        &self,
        order: OrderUuid,
        mutation: OrderMutation,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[derive(Debug, Clone)]
pub struct PgOrdersRepository {
    db: Db,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<(), OrdersServiceError> {
        for reservation in order.reservations() {
            // Stock is an INT column, so a larger request can never be met.
            let reserved = match i32::try_from(reservation.quantity) {
                Ok(quantity) => query_scalar::<_, i32>(RESERVE_STOCK_SQL)
                    .bind(reservation.product_uuid.into_uuid())
                    .bind(quantity)
                    .fetch_optional(&mut **tx)
                    .await?
                    .is_some(),
                Err(_) => false,
            };

            if reserved {
                continue;
            }

            let current: Option<(i32, bool)> = query_as(GET_STOCK_SQL)
                .bind(reservation.product_uuid.into_uuid())
                .fetch_optional(&mut **tx)
                .await?;

            debug!(
                product = %reservation.product_uuid,
                requested = reservation.quantity,
                "stock reservation failed"
            );

            return Err(match current {
                None => OrdersServiceError::ProductNotFound(reservation.product_uuid),
                Some((_, false)) => OrdersServiceError::ProductUnavailable(reservation.product_uuid),
                Some((stock, true)) => OrdersServiceError::InsufficientStock {
                    title: order.title_of(reservation.product_uuid),
                    available: u32::try_from(stock.max(0))?,
                },
            });
        }

        Ok(())
    }

    async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [OrderRecord],
    ) -> Result<(), OrdersServiceError> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut items: FxHashMap<Uuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for row in &rows {
            let order_uuid: Uuid = row.try_get("order_uuid")?;

            items
                .entry(order_uuid)
                .or_default()
                .push(OrderItemRecord::from_row(row)?);
        }

        for order in orders {
            order.items = items.remove(&order.uuid.into_uuid()).unwrap_or_default();
        }

        Ok(())
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        self.reserve_stock(&mut tx, &order).await?;

        let address = &order.shipping_address;

        let mut created = query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.owner.into_uuid())
            .bind(&address.first_name)
            .bind(&address.last_name)
            .bind(&address.street)
            .bind(&address.city)
            .bind(&address.state)
            .bind(&address.zip_code)
            .bind(&address.country)
            .bind(&address.phone)
            .bind(order.payment_method.as_str())
            .bind(order.notes.as_deref())
            .bind(i64::try_from(order.pricing.items_price)?)
            .bind(i64::try_from(order.pricing.tax_price)?)
            .bind(i64::try_from(order.pricing.shipping_price)?)
            .bind(i64::try_from(order.pricing.total_price)?)
            .fetch_one(&mut *tx)
            .await?;

        for (position, item) in (0_i32..).zip(&order.items) {
            query(CREATE_ORDER_ITEM_SQL)
                .bind(order.uuid.into_uuid())
                .bind(position)
                .bind(item.product_uuid.into_uuid())
                .bind(&item.title)
                .bind(i64::try_from(item.price)?)
                .bind(i64::from(item.quantity))
                .bind(&item.image)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        created.items = order.items;

        Ok(created)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        self.attach_items(&mut tx, std::slice::from_mut(&mut record))
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_orders(
        &self,
        owner: Option<UserUuid>,
        page: Page,
    ) -> Result<Paginated<OrderRecord>, OrdersServiceError> {
        let owner = owner.map(UserUuid::into_uuid);
        let mut tx = self.db.begin().await?;

        let mut records = query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(owner)
            .bind(i64::from(page.limit()))
            .bind(i64::try_from(page.offset())?)
            .fetch_all(&mut *tx)
            .await?;

        let total: i64 = query_scalar(COUNT_ORDERS_SQL)
            .bind(owner)
            .fetch_one(&mut *tx)
            .await?;

        self.attach_items(&mut tx, &mut records).await?;

        tx.commit().await?;

        Ok(Paginated {
            records,
            page,
            total: u64::try_from(total)?,
        })
    }

    async fn update_order(
        &self,
        order: OrderUuid,
        mutation: OrderMutation,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        self.attach_items(&mut tx, std::slice::from_mut(&mut record))
            .await?;

        mutation(&mut record)?;

        let payment = record.payment_result.as_ref();

        query(UPDATE_ORDER_SQL)
            .bind(record.uuid.into_uuid())
            .bind(record.status.as_str())
            .bind(record.is_paid)
            .bind(record.paid_at.map(SqlxTimestamp::from))
            .bind(payment.map(|payment| payment.id.as_str()))
            .bind(payment.map(|payment| payment.status.as_str()))
            .bind(payment.map(|payment| SqlxTimestamp::from(payment.update_time)))
            .bind(payment.and_then(|payment| payment.email_address.as_deref()))
            .bind(record.is_delivered)
            .bind(record.delivered_at.map(SqlxTimestamp::from))
            .bind(record.tracking_number.as_deref())
            .bind(SqlxTimestamp::from(record.updated_at))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(record)
    }
}

fn decode_error(index: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(source),
    }
}

fn try_get_amount(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value).map_err(|e| decode_error(column, e))
}

fn try_get_timestamp(row: &PgRow, column: &str) -> sqlx::Result<Option<jiff::Timestamp>> {
    Ok(row
        .try_get::<Option<SqlxTimestamp>, _>(column)?
        .map(SqlxTimestamp::to_jiff))
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i64 = row.try_get("quantity")?;

        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            title: row.try_get("title")?,
            price: try_get_amount(row, "price")?,
            quantity: u32::try_from(quantity).map_err(|e| decode_error("quantity", e))?,
            image: row.try_get("image")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let payment_method: String = row.try_get("payment_method")?;
        let status: String = row.try_get("status")?;
        let payment_id: Option<String> = row.try_get("payment_id")?;

        let payment_result = match payment_id {
            Some(id) => Some(PaymentResult {
                id,
                status: row.try_get("payment_status")?,
                update_time: row
                    .try_get::<SqlxTimestamp, _>("payment_update_time")?
                    .to_jiff(),
                email_address: row.try_get("payment_email")?,
            }),
            None => None,
        };

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            owner: UserUuid::from_uuid(row.try_get("owner_uuid")?),
            items: Vec::new(),
            shipping_address: ShippingAddress {
                first_name: row.try_get("shipping_first_name")?,
                last_name: row.try_get("shipping_last_name")?,
                street: row.try_get("shipping_street")?,
                city: row.try_get("shipping_city")?,
                state: row.try_get("shipping_state")?,
                zip_code: row.try_get("shipping_zip_code")?,
                country: row.try_get("shipping_country")?,
                phone: row.try_get("shipping_phone")?,
            },
            payment_method: payment_method
                .parse()
                .map_err(|e| decode_error("payment_method", e))?,
            notes: row.try_get("notes")?,
            items_price: try_get_amount(row, "items_price")?,
            tax_price: try_get_amount(row, "tax_price")?,
            shipping_price: try_get_amount(row, "shipping_price")?,
            total_price: try_get_amount(row, "total_price")?,
            status: status
                .parse::<OrderStatus>()
                .map_err(|e| decode_error("status", e))?,
            is_paid: row.try_get("is_paid")?,
            paid_at: try_get_timestamp(row, "paid_at")?,
            payment_result,
            is_delivered: row.try_get("is_delivered")?,
            delivered_at: try_get_timestamp(row, "delivered_at")?,
            tracking_number: row.try_get("tracking_number")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
