//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront_app::domain::products::{
    data::NewProduct,
    records::{Category, ProductUuid},
};

use crate::{
    errors::ApiError, extensions::*, products::get::ProductResponse, response::ApiResponse,
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price in cents
    pub price: u64,
    pub category: String,
    pub image: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub discount: u8,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub featured: bool,
}

const fn active_by_default() -> bool {
    true
}

impl CreateProductRequest {
    fn into_new_product(self, uuid: ProductUuid) -> Result<NewProduct, ApiError> {
        let category = self
            .category
            .parse::<Category>()
            .map_err(|_ignored| ApiError::bad_request("Invalid category"))?;

        Ok(NewProduct {
            uuid,
            title: self.title,
            description: self.description,
            price: self.price,
            category,
            image: self.image,
            stock: self.stock,
            discount: self.discount,
            is_active: self.is_active,
            featured: self.featured,
        })
    }
}

/// Create Product Handler
#[endpoint(
    tags("products"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product already exists"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;

    let new_product = json.into_inner().into_new_product(ProductUuid::new())?;

    let product = state
        .app
        .products
        .create_product(identity, new_product)
        .await?;

    res.add_header(LOCATION, format!("/api/products/{}", product.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(ApiResponse::success(product.into()))
}
