//! Products service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    auth::Identity,
    domain::products::{
        data::{NewProduct, ProductFilter, ProductUpdate},
        errors::ProductsServiceError,
        records::{ProductRecord, ProductUuid},
        repository::ProductsRepository,
    },
    pagination::{Page, Paginated},
};

#[derive(Clone)]
pub struct DefaultProductsService {
    repository: Arc<dyn ProductsRepository>,
}

impl DefaultProductsService {
    #[must_use]
    pub fn new(repository: Arc<dyn ProductsRepository>) -> Self {
        Self { repository }
    }
}

fn require_admin(identity: Identity) -> Result<(), ProductsServiceError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(ProductsServiceError::Unauthorized)
    }
}

#[async_trait]
impl ProductsService for DefaultProductsService {
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: Page,
    ) -> Result<Paginated<ProductRecord>, ProductsServiceError> {
        self.repository.list_products(filter, page).await
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let record = self.repository.get_product(product).await?;

        if !record.is_active {
            return Err(ProductsServiceError::NotFound);
        }

        Ok(record)
    }

    async fn create_product(
        &self,
        identity: Identity,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        require_admin(identity)?;

        product.validate()?;

        let created = self.repository.create_product(product).await?;

        info!(product = %created.uuid, "product created");

        Ok(created)
    }

    async fn update_product(
        &self,
        identity: Identity,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        require_admin(identity)?;

        update.validate()?;

        self.repository.update_product(product, update).await
    }

    async fn deactivate_product(
        &self,
        identity: Identity,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError> {
        require_admin(identity)?;

        self.repository.deactivate_product(product).await?;

        info!(product = %product, "product deactivated");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Lists active products, newest first.
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: Page,
    ) -> Result<Paginated<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single active product.
    async fn get_product(&self, product: ProductUuid)
    -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product. Admin only.
    async fn create_product(
        &self,
        identity: Identity,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Applies an update to a product. Admin only.
    async fn update_product(
        &self,
        identity: Identity,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Hides a product from the catalog. Admin only.
    async fn deactivate_product(
        &self,
        identity: Identity,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError>;
}
