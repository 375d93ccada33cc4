//! In-memory storage.
//!
//! Every repository shares one lock, so a checkout sees and takes stock
//! atomically just as the PostgreSQL repositories do inside a transaction.

use std::cmp::Reverse;

use async_trait::async_trait;
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    auth::{
        ActiveApiToken, ApiTokenMetadata, ApiTokenVersion, AuthRepository, AuthServiceError,
        NewApiToken, NewUser, UserRecord, UserUuid,
    },
    domain::{
        carts::{
            errors::CartsServiceError,
            records::CartRecord,
            repositories::{CartMutation, CartsRepository},
        },
        orders::{
            data::NewOrder,
            errors::OrdersServiceError,
            records::{OrderRecord, OrderUuid},
            repository::{OrderMutation, OrdersRepository},
        },
        products::{
            data::{NewProduct, ProductFilter, ProductUpdate},
            errors::ProductsServiceError,
            records::{ProductRecord, ProductUuid},
            repository::ProductsRepository,
        },
    },
    pagination::{Page, Paginated},
};

#[derive(Debug, Clone)]
struct StoredToken {
    metadata: ApiTokenMetadata,
    token_hash: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    users: FxHashMap<UserUuid, UserRecord>,
    tokens: FxHashMap<Uuid, StoredToken>,
    products: FxHashMap<ProductUuid, ProductRecord>,
    carts: FxHashMap<UserUuid, CartRecord>,
    orders: FxHashMap<OrderUuid, OrderRecord>,
}

/// Storage for tests and local runs without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T: Clone>(records: &[T], page: Page) -> Paginated<T> {
    Paginated {
        records: page.slice(records).to_vec(),
        page,
        total: records.len() as u64,
    }
}

#[async_trait]
impl AuthRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthServiceError> {
        let mut state = self.state.lock().await;

        let taken = state.users.contains_key(&user.uuid)
            || state
                .users
                .values()
                .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));

        if taken {
            return Err(AuthServiceError::AlreadyExists);
        }

        let record = UserRecord {
            uuid: user.uuid,
            email: user.email,
            role: user.role,
            created_at: Timestamp::now(),
        };

        state.users.insert(record.uuid, record.clone());

        Ok(record)
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, AuthServiceError> {
        self.state
            .lock()
            .await
            .users
            .get(&user)
            .cloned()
            .ok_or(AuthServiceError::UserNotFound)
    }

    async fn create_api_token(
        &self,
        token: NewApiToken,
    ) -> Result<ApiTokenMetadata, AuthServiceError> {
        let mut state = self.state.lock().await;

        if !state.users.contains_key(&token.user_uuid) {
            return Err(AuthServiceError::UserNotFound);
        }

        if state.tokens.contains_key(&token.uuid) {
            return Err(AuthServiceError::AlreadyExists);
        }

        let metadata = ApiTokenMetadata {
            uuid: token.uuid,
            user_uuid: token.user_uuid,
            version: token.version,
            created_at: Timestamp::now(),
            last_used_at: None,
            expires_at: token.expires_at,
            revoked_at: None,
        };

        state.tokens.insert(
            token.uuid,
            StoredToken {
                metadata: metadata.clone(),
                token_hash: token.token_hash,
            },
        );

        Ok(metadata)
    }

    async fn find_active_api_token(
        &self,
        token_uuid: Uuid,
        version: ApiTokenVersion,
    ) -> Result<Option<ActiveApiToken>, AuthServiceError> {
        let state = self.state.lock().await;
        let now = Timestamp::now();

        let active = state
            .tokens
            .get(&token_uuid)
            .filter(|token| token.metadata.version == version)
            .filter(|token| token.metadata.revoked_at.is_none())
            .filter(|token| token.metadata.expires_at.is_none_or(|expires| expires > now))
            .and_then(|token| {
                state.users.get(&token.metadata.user_uuid).map(|user| ActiveApiToken {
                    user_uuid: user.uuid,
                    role: user.role,
                    version: token.metadata.version,
                    token_hash: token.token_hash.clone(),
                })
            });

        Ok(active)
    }

    async fn touch_api_token_last_used(&self, token_uuid: Uuid) -> Result<(), AuthServiceError> {
        if let Some(token) = self.state.lock().await.tokens.get_mut(&token_uuid) {
            token.metadata.last_used_at = Some(Timestamp::now());
        }

        Ok(())
    }

    async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        let mut state = self.state.lock().await;

        let Some(token) = state
            .tokens
            .get_mut(&token_uuid)
            .filter(|token| token.metadata.revoked_at.is_none())
        else {
            return Ok(false);
        };

        token.metadata.revoked_at = Some(Timestamp::now());

        Ok(true)
    }
}

#[async_trait]
impl ProductsRepository for MemoryStore {
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: Page,
    ) -> Result<Paginated<ProductRecord>, ProductsServiceError> {
        let state = self.state.lock().await;

        let mut records: Vec<ProductRecord> = state
            .products
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();

        records.sort_unstable_by_key(|product| Reverse((product.created_at, product.uuid)));

        Ok(paginate(&records, page))
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        self.state
            .lock()
            .await
            .products
            .get(&product)
            .cloned()
            .ok_or(ProductsServiceError::NotFound)
    }

    async fn get_products(
        &self,
        products: &[ProductUuid],
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let state = self.state.lock().await;

        Ok(products
            .iter()
            .filter_map(|product| state.products.get(product).cloned())
            .collect())
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut state = self.state.lock().await;

        if state.products.contains_key(&product.uuid) {
            return Err(ProductsServiceError::AlreadyExists);
        }

        let record = product.into_record(Timestamp::now());

        state.products.insert(record.uuid, record.clone());

        Ok(record)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut state = self.state.lock().await;

        let record = state
            .products
            .get_mut(&product)
            .ok_or(ProductsServiceError::NotFound)?;

        update.apply(record, Timestamp::now());

        Ok(record.clone())
    }

    async fn deactivate_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        let mut state = self.state.lock().await;

        let record = state
            .products
            .get_mut(&product)
            .ok_or(ProductsServiceError::NotFound)?;

        record.is_active = false;
        record.updated_at = Timestamp::now();

        Ok(())
    }
}

#[async_trait]
impl CartsRepository for MemoryStore {
    async fn get_or_create_cart(&self, owner: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut state = self.state.lock().await;

        let cart = state
            .carts
            .entry(owner)
            .or_insert_with(|| CartRecord::new(owner, Timestamp::now()));

        Ok(cart.clone())
    }

    async fn update_cart(
        &self,
        owner: UserUuid,
        create_missing: bool,
        mutation: CartMutation,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut state = self.state.lock().await;

        let mut cart = match state.carts.get(&owner) {
            Some(cart) => cart.clone(),
            None if create_missing => CartRecord::new(owner, Timestamp::now()),
            None => return Err(CartsServiceError::NotFound),
        };

        mutation(&mut cart)?;

        cart.touch(Timestamp::now());

        state.carts.insert(owner, cart.clone());

        Ok(cart)
    }
}

#[async_trait]
impl OrdersRepository for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        let mut state = self.state.lock().await;
        let reservations = order.reservations();

        for reservation in &reservations {
            let product = state
                .products
                .get(&reservation.product_uuid)
                .ok_or(OrdersServiceError::ProductNotFound(reservation.product_uuid))?;

            if !product.is_active {
                return Err(OrdersServiceError::ProductUnavailable(product.uuid));
            }

            if product.stock < reservation.quantity {
                return Err(OrdersServiceError::InsufficientStock {
                    title: order.title_of(product.uuid),
                    available: product.stock,
                });
            }
        }

        let now = Timestamp::now();

        for reservation in &reservations {
            if let Some(product) = state.products.get_mut(&reservation.product_uuid) {
                product.stock -= reservation.quantity;
                product.updated_at = now;
            }
        }

        let record = order.into_record(now);

        state.orders.insert(record.uuid, record.clone());

        Ok(record)
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        self.state
            .lock()
            .await
            .orders
            .get(&order)
            .cloned()
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn list_orders(
        &self,
        owner: Option<UserUuid>,
        page: Page,
    ) -> Result<Paginated<OrderRecord>, OrdersServiceError> {
        let state = self.state.lock().await;

        let mut records: Vec<OrderRecord> = state
            .orders
            .values()
            .filter(|order| owner.is_none_or(|owner| order.owner == owner))
            .cloned()
            .collect();

        records.sort_unstable_by_key(|order| Reverse((order.created_at, order.uuid)));

        Ok(paginate(&records, page))
    }

    async fn update_order(
        &self,
        order: OrderUuid,
        mutation: OrderMutation,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut state = self.state.lock().await;

        let stored = state
            .orders
            .get_mut(&order)
            .ok_or(OrdersServiceError::NotFound)?;

        let mut record = stored.clone();

        mutation(&mut record)?;

        *stored = record.clone();

        Ok(record)
    }
}
