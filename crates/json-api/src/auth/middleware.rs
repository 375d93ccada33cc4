//! Auth middleware.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*, writing::Scribe};
use tracing::error;

use storefront_app::auth::{AuthServiceError, Identity};

use crate::{errors::ApiError, extensions::*, state::State};

/// Resolve the bearer token to an [`Identity`] for every route below this hoop.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match authenticate(bearer_token(req), depot).await {
        Ok(identity) => {
            depot.insert_identity(identity);
            ctrl.call_next(req, depot, res).await;
        }
        Err(error) => {
            error.render(res);
            ctrl.skip_rest();
        }
    }
}

async fn authenticate(token: Option<&str>, depot: &Depot) -> Result<Identity, ApiError> {
    let token =
        token.ok_or_else(|| ApiError::unauthorized("Missing or invalid Authorization header"))?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .auth
        .authenticate_bearer(token)
        .await
        .map_err(|source| match source {
            AuthServiceError::NotFound | AuthServiceError::UserNotFound => {
                ApiError::unauthorized("Invalid API token")
            }
            source => {
                error!("failed to authenticate api token: {source}");

                ApiError::internal()
            }
        })
}

fn bearer_token(req: &Request) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
