//! Product Index Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use storefront_app::domain::products::{data::ProductFilter, records::Category};

use crate::{
    errors::ApiError,
    extensions::*,
    products::get::ProductResponse,
    response::{ListResponse, requested_page},
    state::State,
};

/// Product Index Handler
///
/// Lists active products, newest first. Public.
#[endpoint(tags("products"), summary = "List Products")]
pub(crate) async fn handler(
    category: QueryParam<String, false>,
    featured: QueryParam<bool, false>,
    min_price: QueryParam<u64, false>,
    max_price: QueryParam<u64, false>,
    page: QueryParam<u32, false>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<ListResponse<ProductResponse>>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let category = category
        .into_inner()
        .map(|category| category.parse::<Category>())
        .transpose()
        .map_err(|_ignored| ApiError::bad_request("Invalid category"))?;

    let filter = ProductFilter {
        category,
        featured: featured.into_inner(),
        min_price: min_price.into_inner(),
        max_price: max_price.into_inner(),
    };

    let products = state
        .app
        .products
        .list_products(filter, requested_page(page, limit))
        .await?;

    Ok(ListResponse::from_page(products))
}
