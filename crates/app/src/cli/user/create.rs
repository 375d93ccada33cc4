use clap::Args;
use storefront_app::auth::{NewUser, Role, UserUuid};

use crate::cli::{auth_service, parse_token_expires_at, print_issued_token};

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Email address, unique per user
    #[arg(long)]
    email: String,

    /// Role granted to the user (`customer` or `admin`)
    #[arg(long, default_value = "customer")]
    role: Role,

    /// Optional expiration for the first token (RFC 3339)
    #[arg(long)]
    token_expires_at: Option<String>,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let token_expires_at = parse_token_expires_at(args.token_expires_at.as_deref())?;

    if args.email.trim().is_empty() {
        return Err("email cannot be empty".to_string());
    }

    let service = auth_service(&args.database_url).await?;

    let user = service
        .create_user(NewUser {
            uuid: UserUuid::new(),
            email: args.email,
            role: args.role,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("user_email: {}", user.email);
    println!("user_role: {}", user.role);

    let issued = service
        .issue_api_token(user.uuid, token_expires_at)
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    print_issued_token(&issued);

    Ok(())
}
