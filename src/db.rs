use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;

/// Builds the connection pool from `DATABASE_URL` and applies embedded
/// migrations, so `main` can call `db::create_pool()` and immediately
/// hand the result to `Extension`.
pub async fn create_pool() -> PgPool {
	let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

	let pool = PgPoolOptions::new()
		.max_connections(10)
		.connect(&database_url)
		.await
		.expect("Failed to connect to database");

	sqlx::migrate!("./migrations")
		.run(&pool)
		.await
		.expect("Failed to run migrations");

	pool
}

pub async fn create_test_pool() -> PgPool {
	let database_url =
		env::var("TEST_DATABASE_URL").unwrap_or_else(|_| env::var("DATABASE_URL").unwrap());

	let pool = PgPoolOptions::new()
		.max_connections(5)
		.connect(&database_url)
		.await
		.expect("Failed to connect to test database");

	sqlx::migrate!("./migrations")
		.run(&pool)
		.await
		.expect("Failed to run migrations");

	pool
}
