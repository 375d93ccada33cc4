//! Get Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::products::records::ProductRecord;

use crate::{errors::ApiError, extensions::*, response::ApiResponse, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    /// The unique identifier of the product
    pub uuid: Uuid,

    pub title: String,

    pub description: String,

    /// List price in cents
    pub price: u64,

    /// Price after the discount, in cents
    pub discounted_price: u64,

    /// One of `men's clothing`, `women's clothing`, `jewelery`, `electronics`
    pub category: String,

    /// Image URL
    pub image: String,

    /// Units available
    pub stock: u32,

    /// Discount percentage
    pub discount: u8,

    pub is_active: bool,

    pub featured: bool,

    /// The date and time the product was created
    pub created_at: String,

    /// The date and time the product was last updated
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        ProductResponse {
            uuid: product.uuid.into(),
            discounted_price: product.discounted_price(),
            price: product.price,
            category: product.category.to_string(),
            title: product.title,
            description: product.description,
            image: product.image,
            stock: product.stock,
            discount: product.discount,
            is_active: product.is_active,
            featured: product.featured,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}

/// Get Product Handler
///
/// Returns an active product. Public.
#[endpoint(
    tags("products"),
    summary = "Get Product",
    responses(
        (status_code = StatusCode::OK, description = "Product found"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .products
        .get_product(product.into_inner().into())
        .await?;

    Ok(ApiResponse::success(product.into()))
}
