//! Carts Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Row, Transaction, query, query_scalar};
use uuid::Uuid;

use crate::{
    auth::UserUuid,
    database::Db,
    domain::carts::{
        errors::CartsServiceError,
        records::{CartRecord, CartUuid},
    },
};

use super::{CartMutation, CartsRepository, items::PgCartItemsRepository};

const ENSURE_CART_SQL: &str = include_str!("../sql/ensure_cart.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const LOCK_CART_SQL: &str = include_str!("../sql/lock_cart.sql");
const TOUCH_CART_SQL: &str = include_str!("../sql/touch_cart.sql");

#[derive(Debug, Clone)]
pub struct PgCartsRepository {
    db: Db,
    items: PgCartItemsRepository,
}

impl PgCartsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            items: PgCartItemsRepository::new(),
        }
    }

    async fn ensure_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: UserUuid,
    ) -> Result<(), sqlx::Error> {
        query(ENSURE_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(owner.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn load_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: UserUuid,
        sql: &'static str,
    ) -> Result<Option<CartRecord>, sqlx::Error> {
        let Some(row) = query(sql)
            .bind(owner.into_uuid())
            .fetch_optional(&mut **tx)
            .await?
        else {
            return Ok(None);
        };

        let uuid = CartUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?);
        let items = self.items.get_cart_items(tx, uuid).await?;

        Ok(Some(CartRecord::from_parts(
            uuid,
            UserUuid::from_uuid(row.try_get("owner_uuid")?),
            items,
            row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        )))
    }
}

#[async_trait]
impl CartsRepository for PgCartsRepository {
    async fn get_or_create_cart(&self, owner: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.ensure_cart(&mut tx, owner).await?;

        let cart = self
            .load_cart(&mut tx, owner, GET_CART_SQL)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn update_cart(
        &self,
        owner: UserUuid,
        create_missing: bool,
        mutation: CartMutation,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        if create_missing {
            self.ensure_cart(&mut tx, owner).await?;
        }

        let mut cart = self
            .load_cart(&mut tx, owner, LOCK_CART_SQL)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        mutation(&mut cart)?;

        self.items
            .replace_cart_items(&mut tx, cart.uuid, cart.items())
            .await?;

        let updated_at: SqlxTimestamp = query_scalar(TOUCH_CART_SQL)
            .bind(cart.uuid.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        cart.touch(updated_at.to_jiff());

        Ok(cart)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestDb, helpers::product_record};

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn cart_lines_survive_a_round_trip_through_postgres() -> TestResult {
        let db = TestDb::new().await;
        let repository = PgCartsRepository::new(db.db());
        let owner = db.create_user().await?;
        let product = db.insert_product(&product_record("Lamp", 3_000, 5)).await?;

        let empty = repository.get_or_create_cart(owner).await?;

        assert!(empty.is_empty());

        let cart = repository
            .update_cart(
                owner,
                false,
                Box::new(move |cart: &mut CartRecord| cart.add(&product, 2)),
            )
            .await?;

        let reloaded = repository.get_or_create_cart(owner).await?;

        assert_eq!(reloaded.uuid, empty.uuid);
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.total(), 6_000);
        assert_eq!(reloaded.updated_at, cart.updated_at);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn failed_mutation_leaves_stored_cart_untouched() -> TestResult {
        let db = TestDb::new().await;
        let repository = PgCartsRepository::new(db.db());
        let owner = db.create_user().await?;

        let result = repository
            .update_cart(
                owner,
                true,
                Box::new(|cart: &mut CartRecord| {
                    cart.clear();
                    Err(CartsServiceError::InvalidQuantity)
                }),
            )
            .await;

        assert!(matches!(result, Err(CartsServiceError::InvalidQuantity)));

        let missing = repository
            .update_cart(owner, false, Box::new(|_: &mut CartRecord| Ok(())))
            .await;

        assert!(matches!(missing, Err(CartsServiceError::NotFound)));

        let cart = repository.get_or_create_cart(owner).await?;

        assert!(cart.is_empty());

        Ok(())
    }
}
