//! Cart Repositories

use async_trait::async_trait;

use crate::{
    auth::UserUuid,
    domain::carts::{errors::CartsServiceError, records::CartRecord},
};

mod carts;
mod items;

pub use carts::PgCartsRepository;

/// A change applied to a cart while the owner's cart is locked.
///
/// Returning an error discards the change.
pub type CartMutation =
    Box<dyn FnOnce(&mut CartRecord) -> Result<(), CartsServiceError> + Send>;

/// Cart persistence. Changes to one owner's cart are serialized.
#[async_trait]
pub trait CartsRepository: Send + Sync {
    /// The owner's cart, created empty if absent.
    async fn get_or_create_cart(&self, owner: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Apply `mutation` to the owner's cart and persist the result.
    ///
    /// Without `create_missing`, an owner with no cart yields
    /// [`CartsServiceError::NotFound`].
    async fn update_cart(
        &self,
        owner: UserUuid,
        create_missing: bool,
        mutation: CartMutation,
    ) -> Result<CartRecord, CartsServiceError>;
}
