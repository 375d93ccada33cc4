//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::Depot;

use storefront_app::auth::Identity;

use crate::errors::ApiError;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError>;

    fn insert_identity(&mut self, identity: Identity);

    fn identity(&self) -> Option<Identity>;

    /// The authenticated caller, or 401 when the auth hoop did not run.
    fn identity_or_401(&self) -> Result<Identity, ApiError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, ApiError> {
        self.obtain::<T>()
            .map_err(|_ignored| ApiError::internal())
    }

    fn insert_identity(&mut self, identity: Identity) {
        self.inject(identity);
    }

    fn identity(&self) -> Option<Identity> {
        self.obtain::<Identity>().ok().copied()
    }

    fn identity_or_401(&self) -> Result<Identity, ApiError> {
        self.identity()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn identity_round_trips_through_the_depot() {
        let identity = Identity::customer(Uuid::now_v7().into());
        let mut depot = Depot::new();

        depot.insert_identity(identity);

        assert_eq!(depot.identity_or_401(), Ok(identity));
    }

    #[test]
    fn missing_identity_is_unauthorized() {
        let depot = Depot::new();

        let error = depot.identity_or_401().err();

        assert_eq!(error.map(|error| error.code()), Some(StatusCode::UNAUTHORIZED));
    }
}
