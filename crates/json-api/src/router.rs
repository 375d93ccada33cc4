//! App Router

use salvo::Router;

use crate::{auth, carts, healthcheck, orders, products};

/// Every route served under `/api`.
pub(crate) fn api_router() -> Router {
    Router::with_path("api")
        .push(Router::with_path("health").get(healthcheck::handler))
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(Router::with_path("{product}").get(products::get::handler)),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("products")
                        .post(products::create::handler)
                        .push(
                            Router::with_path("{product}")
                                .put(products::update::handler)
                                .delete(products::delete::handler),
                        ),
                )
                .push(
                    Router::with_path("cart")
                        .get(carts::get::handler)
                        .push(Router::with_path("add").post(carts::add::handler))
                        .push(Router::with_path("update/{product_id}").put(carts::update::handler))
                        .push(
                            Router::with_path("remove/{product_id}").delete(carts::remove::handler),
                        )
                        .push(Router::with_path("clear").delete(carts::clear::handler))
                        .push(Router::with_path("merge").post(carts::merge::handler)),
                )
                .push(
                    Router::with_path("orders")
                        .get(orders::index::handler)
                        .post(orders::create::handler)
                        .push(Router::with_path("myorders").get(orders::mine::handler))
                        .push(
                            Router::with_path("{id}")
                                .get(orders::get::handler)
                                .push(Router::with_path("pay").put(orders::pay::handler))
                                .push(Router::with_path("status").put(orders::status::handler)),
                        ),
                ),
        )
}
