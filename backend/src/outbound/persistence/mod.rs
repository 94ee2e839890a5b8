//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Authorization and business rules live in the domain
//!   services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Classified errors**: Diesel failures are classified by SQLSTATE and
//!   named constraint into [`RepositoryError`](crate::domain::ports::RepositoryError)
//!   variants.
//!
//! # Example
//!
//! ```ignore
//! use carmarket::outbound::persistence::{DbPool, PoolConfig, DieselCarRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/carmarket")).await?;
//! let cars = DieselCarRepository::new(pool);
//! ```

mod constraints;
mod diesel_car_model_repository;
mod diesel_car_repository;
mod diesel_helpers;
mod diesel_manufacturer_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_car_model_repository::DieselCarModelRepository;
pub use diesel_car_repository::DieselCarRepository;
pub use diesel_manufacturer_repository::DieselManufacturerRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, migrate, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
