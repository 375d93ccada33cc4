//! Carts service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    auth::Identity,
    domain::{
        carts::{
            data::{CartMerge, GuestCartLine},
            errors::{CartsServiceError, line_quantity},
            reconcile::MergePlan,
            records::CartRecord,
            repositories::CartsRepository,
        },
        products::{records::ProductUuid, repository::ProductsRepository},
    },
};

#[derive(Clone)]
pub struct DefaultCartsService {
    carts: Arc<dyn CartsRepository>,
    products: Arc<dyn ProductsRepository>,
}

impl DefaultCartsService {
    #[must_use]
    pub fn new(carts: Arc<dyn CartsRepository>, products: Arc<dyn ProductsRepository>) -> Self {
        Self { carts, products }
    }
}

#[async_trait]
impl CartsService for DefaultCartsService {
    async fn get_cart(&self, identity: Identity) -> Result<CartRecord, CartsServiceError> {
        self.carts.get_or_create_cart(identity.user).await
    }

    async fn add_item(
        &self,
        identity: Identity,
        product: ProductUuid,
        amount: i64,
    ) -> Result<CartRecord, CartsServiceError> {
        let quantity = line_quantity(amount)?;
        let product = self.products.get_product(product).await?;

        if !product.is_active {
            return Err(CartsServiceError::ProductNotFound);
        }

        let cart = self
            .carts
            .update_cart(
                identity.user,
                true,
                Box::new(move |cart: &mut CartRecord| cart.add(&product, quantity)),
            )
            .await?;

        debug!(cart = %cart.uuid, items = cart.item_count(), "item added to cart");

        Ok(cart)
    }

    async fn update_item(
        &self,
        identity: Identity,
        product: ProductUuid,
        amount: i64,
    ) -> Result<CartRecord, CartsServiceError> {
        let quantity = line_quantity(amount)?;

        self.carts
            .update_cart(
                identity.user,
                false,
                Box::new(move |cart: &mut CartRecord| cart.set_quantity(product, quantity)),
            )
            .await
    }

    async fn remove_item(
        &self,
        identity: Identity,
        product: ProductUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        self.carts
            .update_cart(
                identity.user,
                false,
                Box::new(move |cart: &mut CartRecord| {
                    cart.remove(product);
                    Ok(())
                }),
            )
            .await
    }

    async fn clear_cart(&self, identity: Identity) -> Result<CartRecord, CartsServiceError> {
        self.carts
            .update_cart(
                identity.user,
                false,
                Box::new(|cart: &mut CartRecord| {
                    cart.clear();
                    Ok(())
                }),
            )
            .await
    }

    async fn merge_guest_cart(
        &self,
        identity: Identity,
        lines: Vec<GuestCartLine>,
    ) -> Result<CartMerge, CartsServiceError> {
        // Reject bad quantities before touching the catalog or the cart.
        for line in &lines {
            line_quantity(line.quantity)?;
        }

        let mut products: Vec<ProductUuid> = lines.iter().map(|line| line.product_uuid).collect();
        products.sort_unstable();
        products.dedup();

        let catalog = self.products.get_products(&products).await?;
        let plan = MergePlan::new(&lines, catalog)?;
        let skipped = plan.skipped().to_vec();

        let cart = self
            .carts
            .update_cart(
                identity.user,
                true,
                Box::new(move |cart: &mut CartRecord| plan.apply(cart)),
            )
            .await?;

        debug!(
            cart = %cart.uuid,
            lines = lines.len(),
            skipped = skipped.len(),
            "guest cart merged"
        );

        Ok(CartMerge { cart, skipped })
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The caller's cart, created empty on first access.
    async fn get_cart(&self, identity: Identity) -> Result<CartRecord, CartsServiceError>;

    /// Add `amount` of an active product to the caller's cart.
    async fn add_item(
        &self,
        identity: Identity,
        product: ProductUuid,
        amount: i64,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Overwrite the quantity of an existing line.
    async fn update_item(
        &self,
        identity: Identity,
        product: ProductUuid,
        amount: i64,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove a line if present.
    async fn remove_item(
        &self,
        identity: Identity,
        product: ProductUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove every line.
    async fn clear_cart(&self, identity: Identity) -> Result<CartRecord, CartsServiceError>;

    /// Fold a guest cart into the caller's cart using current catalog snapshots.
    async fn merge_guest_cart(
        &self,
        identity: Identity,
        lines: Vec<GuestCartLine>,
    ) -> Result<CartMerge, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::products::data::ProductUpdate, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn get_cart_creates_an_empty_cart_once() -> TestResult {
        let ctx = TestContext::new();

        let first = ctx.carts.get_cart(ctx.customer).await?;
        let second = ctx.carts.get_cart(ctx.customer).await?;

        assert!(first.is_empty());
        assert_eq!(first.uuid, second.uuid);
        assert_eq!(first.owner, ctx.customer.user);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_snapshots_the_product() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 3_250, 4).await?;

        let cart = ctx.carts.add_item(ctx.customer, product.uuid, 2).await?;

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].title, "Kettle");
        assert_eq!(cart.total(), 6_500);
        assert_eq!(cart.item_count(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_keeps_the_list_price_for_discounted_products() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_discounted_product("Coat", 2_000, 10, 5).await?;

        let cart = ctx.carts.add_item(ctx.customer, product.uuid, 3).await?;

        assert_eq!(cart.items()[0].price, 2_000);
        assert_eq!(cart.total(), 6_000);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_rejects_unknown_and_inactive_products() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 3_250, 4).await?;

        ctx.products
            .update_product(
                ctx.admin,
                product.uuid,
                ProductUpdate {
                    is_active: Some(false),
                    ..ProductUpdate::default()
                },
            )
            .await?;

        let inactive = ctx.carts.add_item(ctx.customer, product.uuid, 1).await;
        let unknown = ctx.carts.add_item(ctx.customer, ProductUuid::new(), 1).await;

        assert!(matches!(inactive, Err(CartsServiceError::ProductNotFound)));
        assert!(matches!(unknown, Err(CartsServiceError::ProductNotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn add_item_rejects_non_positive_amounts() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 3_250, 4).await?;

        let result = ctx.carts.add_item(ctx.customer, product.uuid, 0).await;

        assert!(matches!(result, Err(CartsServiceError::InvalidQuantity)));

        Ok(())
    }

    #[tokio::test]
    async fn update_item_below_one_leaves_cart_unchanged() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 3_250, 4).await?;

        let before = ctx.carts.add_item(ctx.customer, product.uuid, 2).await?;

        for amount in [0, -1, i64::MIN] {
            let result = ctx.carts.update_item(ctx.customer, product.uuid, amount).await;

            assert!(
                matches!(result, Err(CartsServiceError::InvalidQuantity)),
                "expected InvalidQuantity for {amount}, got {result:?}"
            );
        }

        let after = ctx.carts.get_cart(ctx.customer).await?;

        assert_eq!(after.items(), before.items());
        assert_eq!(after.total(), before.total());

        Ok(())
    }

    #[tokio::test]
    async fn update_item_requires_cart_and_line() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 3_250, 4).await?;

        let no_cart = ctx.carts.update_item(ctx.customer, product.uuid, 2).await;

        assert!(matches!(no_cart, Err(CartsServiceError::NotFound)));

        ctx.carts.get_cart(ctx.customer).await?;

        let no_line = ctx.carts.update_item(ctx.customer, product.uuid, 2).await;

        assert!(matches!(no_line, Err(CartsServiceError::ItemNotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn update_item_overwrites_quantity() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 1_000, 10).await?;

        ctx.carts.add_item(ctx.customer, product.uuid, 2).await?;

        let cart = ctx.carts.update_item(ctx.customer, product.uuid, 5).await?;

        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total(), 5_000);

        Ok(())
    }

    #[tokio::test]
    async fn remove_and_clear_need_an_existing_cart() {
        let ctx = TestContext::new();

        let removed = ctx.carts.remove_item(ctx.customer, ProductUuid::new()).await;
        let cleared = ctx.carts.clear_cart(ctx.customer).await;

        assert!(matches!(removed, Err(CartsServiceError::NotFound)));
        assert!(matches!(cleared, Err(CartsServiceError::NotFound)));
    }

    #[tokio::test]
    async fn removing_a_missing_line_is_a_no_op() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 1_000, 10).await?;

        let before = ctx.carts.add_item(ctx.customer, product.uuid, 1).await?;
        let after = ctx.carts.remove_item(ctx.customer, ProductUuid::new()).await?;

        assert_eq!(after.items(), before.items());

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_zeroes_totals() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 1_000, 10).await?;

        ctx.carts.add_item(ctx.customer, product.uuid, 3).await?;

        let cart = ctx.carts.clear_cart(ctx.customer).await?;

        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
        assert_eq!(cart.item_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn carts_are_private_to_their_owner() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Kettle", 1_000, 10).await?;

        ctx.carts.add_item(ctx.customer, product.uuid, 3).await?;

        let other = ctx.carts.get_cart(ctx.admin).await?;

        assert!(other.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn merge_adds_guest_quantities_with_current_snapshots() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Scarf", 1_500, 10).await?;

        ctx.carts.add_item(ctx.customer, product.uuid, 1).await?;

        ctx.products
            .update_product(
                ctx.admin,
                product.uuid,
                ProductUpdate {
                    price: Some(1_200),
                    ..ProductUpdate::default()
                },
            )
            .await?;

        let merged = ctx
            .carts
            .merge_guest_cart(
                ctx.customer,
                vec![GuestCartLine {
                    product_uuid: product.uuid,
                    quantity: 2,
                }],
            )
            .await?;

        assert!(merged.skipped.is_empty());
        assert_eq!(merged.cart.items().len(), 1);
        assert_eq!(merged.cart.items()[0].quantity, 3);
        assert_eq!(merged.cart.items()[0].price, 1_200);
        assert_eq!(merged.cart.total(), 3_600);

        Ok(())
    }

    #[tokio::test]
    async fn merge_reports_skipped_products() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Scarf", 1_500, 10).await?;
        let missing = ProductUuid::new();

        let merged = ctx
            .carts
            .merge_guest_cart(
                ctx.customer,
                vec![
                    GuestCartLine {
                        product_uuid: missing,
                        quantity: 1,
                    },
                    GuestCartLine {
                        product_uuid: product.uuid,
                        quantity: 1,
                    },
                ],
            )
            .await?;

        assert_eq!(merged.skipped, [missing]);
        assert_eq!(merged.cart.item_count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn merge_with_bad_quantity_writes_nothing() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Scarf", 1_500, 10).await?;

        let result = ctx
            .carts
            .merge_guest_cart(
                ctx.customer,
                vec![
                    GuestCartLine {
                        product_uuid: product.uuid,
                        quantity: 2,
                    },
                    GuestCartLine {
                        product_uuid: product.uuid,
                        quantity: 0,
                    },
                ],
            )
            .await;

        assert!(matches!(result, Err(CartsServiceError::InvalidQuantity)));

        let cleared = ctx.carts.clear_cart(ctx.customer).await;

        assert!(
            matches!(cleared, Err(CartsServiceError::NotFound)),
            "merge must not have created a cart, got {cleared:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_adds_do_not_lose_updates() -> TestResult {
        let ctx = TestContext::new();
        let product = ctx.create_product("Sticker", 100, 1_000).await?;

        let mut tasks = Vec::new();

        for _ in 0..32 {
            let carts = Arc::clone(&ctx.carts);
            let identity = ctx.customer;
            let product = product.uuid;

            tasks.push(tokio::spawn(async move {
                carts.add_item(identity, product, 1).await
            }));
        }

        for task in tasks {
            task.await??;
        }

        let cart = ctx.carts.get_cart(ctx.customer).await?;

        assert_eq!(cart.item_count(), 32);
        assert_eq!(cart.total(), 3_200);

        Ok(())
    }
}
