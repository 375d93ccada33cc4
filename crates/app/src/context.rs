//! App Context

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::{
    auth::{AuthService, DefaultAuthService, PgAuthRepository},
    database::{self, Db},
    domain::{
        carts::{CartsService, DefaultCartsService, repositories::PgCartsRepository},
        orders::{
            DefaultOrdersService, OrdersService, pricing::PricingPolicy,
            repository::PgOrdersRepository,
        },
        products::{DefaultProductsService, ProductsService, repository::PgProductsRepository},
    },
    storage::MemoryStore,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        pricing: PricingPolicy,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_pool(pool, pricing))
    }

    /// Build application context over an existing connection pool.
    #[must_use]
    pub fn from_pool(pool: PgPool, pricing: PricingPolicy) -> Self {
        let db = Db::new(pool);
        let products = Arc::new(PgProductsRepository::new(db.clone()));
        let users = Arc::new(PgAuthRepository::new(db.clone()));

        Self {
            products: Arc::new(DefaultProductsService::new(products.clone())),
            carts: Arc::new(DefaultCartsService::new(
                Arc::new(PgCartsRepository::new(db.clone())),
                products.clone(),
            )),
            orders: Arc::new(DefaultOrdersService::new(
                Arc::new(PgOrdersRepository::new(db)),
                products,
                users.clone(),
                pricing,
            )),
            auth: Arc::new(DefaultAuthService::new(users)),
        }
    }

    /// Build application context over a single in-memory store.
    #[must_use]
    pub fn in_memory(store: Arc<MemoryStore>, pricing: PricingPolicy) -> Self {
        Self {
            products: Arc::new(DefaultProductsService::new(store.clone())),
            carts: Arc::new(DefaultCartsService::new(store.clone(), store.clone())),
            orders: Arc::new(DefaultOrdersService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                pricing,
            )),
            auth: Arc::new(DefaultAuthService::new(store)),
        }
    }
}
