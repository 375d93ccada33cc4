//! Products Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::Db,
    domain::products::{
        data::{NewProduct, ProductFilter, ProductUpdate},
        errors::ProductsServiceError,
        records::{Category, ProductRecord, ProductUuid},
    },
    pagination::{Page, Paginated},
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const COUNT_PRODUCTS_SQL: &str = include_str!("sql/count_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_PRODUCTS_SQL: &str = include_str!("sql/get_products.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DEACTIVATE_PRODUCT_SQL: &str = include_str!("sql/deactivate_product.sql");

/// Catalog persistence.
#[async_trait]
pub trait ProductsRepository: Send + Sync {
    /// Active products matching `filter`, newest first.
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: Page,
    ) -> Result<Paginated<ProductRecord>, ProductsServiceError>;

    /// A product regardless of whether it is active.
    async fn get_product(&self, product: ProductUuid)
    -> Result<ProductRecord, ProductsServiceError>;

    /// The subset of `products` that exist, in no particular order.
    async fn get_products(
        &self,
        products: &[ProductUuid],
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    async fn deactivate_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError>;
}

#[derive(Debug, Clone)]
pub struct PgProductsRepository {
    db: Db,
}

impl PgProductsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

struct FilterBinds {
    category: Option<&'static str>,
    featured: Option<bool>,
    min_price: Option<i64>,
    max_price: Option<i64>,
}

impl TryFrom<ProductFilter> for FilterBinds {
    type Error = ProductsServiceError;

    fn try_from(filter: ProductFilter) -> Result<Self, Self::Error> {
        Ok(Self {
            category: filter.category.map(Category::as_str),
            featured: filter.featured,
            min_price: filter.min_price.map(i64::try_from).transpose()?,
            max_price: filter.max_price.map(i64::try_from).transpose()?,
        })
    }
}

#[async_trait]
impl ProductsRepository for PgProductsRepository {
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: Page,
    ) -> Result<Paginated<ProductRecord>, ProductsServiceError> {
        let binds = FilterBinds::try_from(filter)?;
        let mut tx = self.db.begin().await?;

        let records = query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .bind(binds.category)
            .bind(binds.featured)
            .bind(binds.min_price)
            .bind(binds.max_price)
            .bind(i64::from(page.limit()))
            .bind(i64::try_from(page.offset())?)
            .fetch_all(&mut *tx)
            .await?;

        let total: i64 = query_scalar(COUNT_PRODUCTS_SQL)
            .bind(binds.category)
            .bind(binds.featured)
            .bind(binds.min_price)
            .bind(binds.max_price)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Paginated {
            records,
            page,
            total: u64::try_from(total)?,
        })
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let record = query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(self.db.pool())
            .await?;

        Ok(record)
    }

    async fn get_products(
        &self,
        products: &[ProductUuid],
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let uuids: Vec<Uuid> = products.iter().map(|product| product.into_uuid()).collect();

        let records = query_as::<Postgres, ProductRecord>(GET_PRODUCTS_SQL)
            .bind(uuids)
            .fetch_all(self.db.pool())
            .await?;

        Ok(records)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let created = query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.title.trim())
            .bind(product.description.trim())
            .bind(i64::try_from(product.price)?)
            .bind(product.category.as_str())
            .bind(product.image.trim())
            .bind(i32::try_from(product.stock)?)
            .bind(i16::from(product.discount))
            .bind(product.is_active)
            .bind(product.featured)
            .fetch_one(self.db.pool())
            .await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let updated = query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(update.title.as_deref().map(str::trim))
            .bind(update.description.as_deref().map(str::trim))
            .bind(update.price.map(i64::try_from).transpose()?)
            .bind(update.category.map(Category::as_str))
            .bind(update.image.as_deref().map(str::trim))
            .bind(update.stock.map(i32::try_from).transpose()?)
            .bind(update.discount.map(i16::from))
            .bind(update.is_active)
            .bind(update.featured)
            .fetch_one(self.db.pool())
            .await?;

        Ok(updated)
    }

    async fn deactivate_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        let rows_affected = query(DEACTIVATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        Ok(())
    }
}

fn decode_error(index: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let price_i64: i64 = row.try_get("price")?;
        let stock_i32: i32 = row.try_get("stock")?;
        let discount_i16: i16 = row.try_get("discount")?;
        let category: String = row.try_get("category")?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: u64::try_from(price_i64).map_err(|e| decode_error("price", e))?,
            category: category.parse().map_err(|e| decode_error("category", e))?,
            image: row.try_get("image")?,
            stock: u32::try_from(stock_i32).map_err(|e| decode_error("stock", e))?,
            discount: u8::try_from(discount_i16).map_err(|e| decode_error("discount", e))?,
            is_active: row.try_get("is_active")?,
            featured: row.try_get("featured")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
