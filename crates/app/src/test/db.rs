//! Database test utilities and shared infrastructure

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool, query, query_scalar};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

use crate::{
    auth::UserUuid,
    database::{self, Db},
    domain::products::{
        ProductsServiceError,
        data::NewProduct,
        records::{ProductRecord, ProductUuid},
        repository::{PgProductsRepository, ProductsRepository},
    },
};

const TEST_USER: &str = "storefront_test";
const TEST_PASSWORD: &str = "storefront_test_password";

/// Validates a generated database name before it is interpolated into DDL.
fn validate_database_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 63 {
        return Err("Database name must be 1-63 characters long".to_string());
    }

    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err("Database name must start with a letter or underscore".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Database name can only contain letters, digits and underscores".to_string());
    }

    Ok(())
}

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(TEST_USER)
        .with_password(TEST_PASSWORD)
        .with_db_name("storefront_test")
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

/// Shared PostgreSQL container that starts once and is reused across all tests
static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

static CLEANUP_SENDER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn init_cleanup_task() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(db_name) = receiver.recv().await {
            if let Err(err) = cleanup_database(&db_name).await {
                eprintln!("Failed to cleanup database '{db_name}': {err}");
            }
        }
    });

    sender
}

async fn server_url(database: &str) -> String {
    let container = POSTGRES_CONTAINER
        .get_or_init(init_postgres_container)
        .await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{TEST_USER}:{TEST_PASSWORD}@{host}:{port}/{database}")
}

async fn cleanup_database(db_name: &str) -> Result<(), sqlx::Error> {
    if POSTGRES_CONTAINER.get().is_none() || validate_database_name(db_name).is_err() {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&server_url("postgres").await).await?;

    query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// An isolated, migrated database inside the shared container.
///
/// Every test gets its own database, dropped in the background once the
/// `TestDb` goes out of scope.
#[derive(Debug, Clone)]
pub(crate) struct TestDb {
    pool: PgPool,
    name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = CLEANUP_SENDER.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        let _cleanup_sender = CLEANUP_SENDER.get_or_init(init_cleanup_task).await;

        let name = format!("storefront_{}", uuid::Uuid::now_v7().simple());

        if let Err(error) = validate_database_name(&name) {
            panic!("Invalid database name '{name}': {error}");
        }

        let mut conn = PgConnection::connect(&server_url("postgres").await)
            .await
            .expect("Failed to connect to postgres database");

        query(&format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let pool = database::connect(&server_url(&name).await)
            .await
            .expect("Failed to create pool for database");

        database::migrate(&pool)
            .await
            .expect("Failed to run migrations on database");

        Self { pool, name }
    }

    pub fn db(&self) -> Db {
        Db::new(self.pool.clone())
    }

    /// Insert a customer to own carts and orders.
    pub async fn create_user(&self) -> Result<UserUuid, sqlx::Error> {
        let user = UserUuid::new();

        query("INSERT INTO users (uuid, email, role) VALUES ($1, $2, 'customer')")
            .bind(user.into_uuid())
            .bind(format!("{user}@example.com"))
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn insert_product(
        &self,
        product: &ProductRecord,
    ) -> Result<ProductRecord, ProductsServiceError> {
        PgProductsRepository::new(self.db())
            .create_product(NewProduct {
                uuid: product.uuid,
                title: product.title.clone(),
                description: product.description.clone(),
                price: product.price,
                category: product.category,
                image: product.image.clone(),
                stock: product.stock,
                discount: product.discount,
                is_active: product.is_active,
                featured: product.featured,
            })
            .await
    }

    pub async fn stock_of(&self, product: ProductUuid) -> Result<u32, ProductsServiceError> {
        let stock: i32 = query_scalar("SELECT stock FROM products WHERE uuid = $1")
            .bind(product.into_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(u32::try_from(stock)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_valid() {
        assert!(validate_database_name("storefront_0192f1c3a7d8").is_ok());
    }

    #[test]
    fn unsafe_names_are_rejected() {
        assert!(validate_database_name("").is_err());
        assert!(validate_database_name("1starts_with_digit").is_err());
        assert!(validate_database_name("has-hyphen").is_err());
        assert!(validate_database_name("quote\"d").is_err());
        assert!(validate_database_name(&"a".repeat(64)).is_err());
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn migrated_database_accepts_queries() {
        let test_db = TestDb::new().await;

        let result: i32 = query_scalar("SELECT 1")
            .fetch_one(&test_db.pool)
            .await
            .expect("Failed to execute test query");

        assert_eq!(result, 1);
    }
}
