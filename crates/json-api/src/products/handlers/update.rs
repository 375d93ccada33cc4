//! Update Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::products::{data::ProductUpdate, records::Category};

use crate::{
    errors::ApiError, extensions::*, products::get::ProductResponse, response::ApiResponse,
    state::State,
};

/// Update Product Request
///
/// Only the listed fields may be changed; anything else is rejected.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<u32>,
    pub discount: Option<u8>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
}

impl TryFrom<UpdateProductRequest> for ProductUpdate {
    type Error = ApiError;

    fn try_from(request: UpdateProductRequest) -> Result<Self, Self::Error> {
        let category = request
            .category
            .map(|category| category.parse::<Category>())
            .transpose()
            .map_err(|_ignored| ApiError::bad_request("Invalid category"))?;

        Ok(ProductUpdate {
            title: request.title,
            description: request.description,
            price: request.price,
            category,
            image: request.image,
            stock: request.stock,
            discount: request.discount,
            is_active: request.is_active,
            featured: request.featured,
        })
    }
}

/// Product Update Handler
#[endpoint(
    tags("products"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
    ),
)]
#[tracing::instrument(
    name = "products.update",
    skip(product, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
    ),
    err(Debug)
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ApiResponse<ProductResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let identity = depot.identity_or_401()?;
    let update = ProductUpdate::try_from(json.into_inner())?;
    let product = product.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(identity.user));
    span.record("product_uuid", tracing::field::display(product));

    let product = state
        .app
        .products
        .update_product(identity, product.into(), update)
        .await?;

    tracing::info!(product_uuid = %product.uuid, price = product.price, "updated product");

    Ok(ApiResponse::success(product.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::products::{
        MockProductsService, ProductsServiceError, records::ProductUuid,
    };

    use crate::test_helpers::{TEST_ADMIN, make_product, products_service};

    use super::*;

    fn make_service(products: MockProductsService) -> Service {
        products_service(products, Router::with_path("products/{product}").put(handler))
    }

    fn strict_mock() -> MockProductsService {
        let mut products = MockProductsService::new();

        products.expect_get_product().never();
        products.expect_create_product().never();
        products.expect_list_products().never();
        products.expect_deactivate_product().never();

        products
    }

    #[tokio::test]
    async fn test_update_product_success() -> TestResult {
        let uuid = ProductUuid::new();

        let mut product = make_product(uuid);

        product.price = 200;
        product.featured = true;

        let mut products = strict_mock();

        products
            .expect_update_product()
            .once()
            .withf(move |identity, u, update| {
                *identity == TEST_ADMIN
                    && *u == uuid
                    && *update
                        == ProductUpdate {
                            price: Some(200),
                            featured: Some(true),
                            ..ProductUpdate::default()
                        }
            })
            .return_once(move |_, _, _| Ok(product));

        let mut res = TestClient::put(format!("http://example.com/products/{uuid}"))
            .json(&json!({ "price": 200, "featured": true }))
            .send(&make_service(products))
            .await;

        let body: ApiResponse<ProductResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.data.price, 200);
        assert!(body.data.featured, "expected featured flag to be set");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_unknown_field_returns_400() -> TestResult {
        let mut products = strict_mock();

        products.expect_update_product().never();

        let res = TestClient::put(format!("http://example.com/products/{}", Uuid::now_v7()))
            .json(&json!({ "price": 200, "uuid": Uuid::now_v7() }))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_invalid_uuid_returns_400() -> TestResult {
        let mut products = strict_mock();

        products.expect_update_product().never();

        let res = TestClient::put("http://example.com/products/123")
            .json(&json!({ "price": 200 }))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product_returns_404() -> TestResult {
        let mut products = strict_mock();

        products
            .expect_update_product()
            .once()
            .return_once(|_, _, _| Err(ProductsServiceError::NotFound));

        let res = TestClient::put(format!("http://example.com/products/{}", Uuid::now_v7()))
            .json(&json!({ "stock": 4 }))
            .send(&make_service(products))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
