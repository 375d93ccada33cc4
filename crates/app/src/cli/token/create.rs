use clap::Args;
use storefront_app::auth::UserUuid;

use crate::cli::{auth_service, parse_token_expires_at, print_issued_token};

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// User UUID that should own the token
    #[arg(long)]
    user_uuid: UserUuid,

    /// Optional token expiration timestamp (RFC 3339)
    #[arg(long)]
    token_expires_at: Option<String>,
}

pub(crate) async fn run(args: CreateTokenArgs) -> Result<(), String> {
    let token_expires_at = parse_token_expires_at(args.token_expires_at.as_deref())?;

    let issued = auth_service(&args.database_url)
        .await?
        .issue_api_token(args.user_uuid, token_expires_at)
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    print_issued_token(&issued);

    Ok(())
}
