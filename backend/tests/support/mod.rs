//! Shared helper utilities for backend integration tests.
//!
//! Database-backed suites run against the PostgreSQL instance named by
//! `TEST_DATABASE_URL`. When the variable is unset they are skipped, unless
//! `REQUIRE_TEST_DATABASE` is truthy, in which case they fail so CI breakage
//! is not masked.

use std::sync::{Mutex, MutexGuard, PoisonError};

use carmarket::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use diesel::pg::PgConnection;
use diesel::{Connection, RunQueryDsl};

/// Connection string for the throwaway test database.
pub const DATABASE_URL_ENV: &str = "TEST_DATABASE_URL";
const REQUIRE_DATABASE_ENV: &str = "REQUIRE_TEST_DATABASE";

static DATABASE_LOCK: Mutex<()> = Mutex::new(());

/// Returns true when `REQUIRE_TEST_DATABASE` is set to a truthy value.
///
/// Truthy values: "1", "true", "yes" (case-insensitive).
pub fn database_required() -> bool {
    std::env::var(REQUIRE_DATABASE_ENV)
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Return the test database URL, or `None` after printing a skip marker.
pub fn database_url() -> Option<String> {
    match std::env::var(DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ if database_required() => {
            panic!("{DATABASE_URL_ENV} is not set and {REQUIRE_DATABASE_ENV} is enabled")
        }
        _ => {
            eprintln!("SKIP-TEST-DATABASE: {DATABASE_URL_ENV} is not set");
            None
        }
    }
}

/// Exclusive handle on a migrated database with every table emptied.
///
/// Tests in one binary share the database, so the handle holds a process-wide
/// lock until dropped.
pub struct TestDatabase {
    pub url: String,
    _guard: MutexGuard<'static, ()>,
}

impl TestDatabase {
    /// Open a small pool against the database.
    pub async fn pool(&self) -> DbPool {
        DbPool::new(PoolConfig::new(self.url.clone()).with_max_size(2))
            .await
            .expect("test pool builds")
    }
}

/// Migrate and empty the test database, or `None` when it is not configured.
pub fn fresh_database() -> Option<TestDatabase> {
    let url = database_url()?;
    let guard = DATABASE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    run_pending_migrations(&url).expect("migrations apply");
    let mut conn = PgConnection::establish(&url).expect("connect to test database");
    diesel::sql_query(
        "TRUNCATE user_favorite_cars, cars, car_models, car_manufacturers, users CASCADE",
    )
    .execute(&mut conn)
    .expect("tables truncate");
    Some(TestDatabase { url, _guard: guard })
}
