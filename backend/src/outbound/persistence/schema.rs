//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, update this file to match. The
//! `diesel print-schema` command can generate these definitions from a live
//! database.

diesel::table! {
    /// User accounts. Rows are soft deleted via `deleted_at`.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// `admin` or `user`, guarded by `ck_users_role`.
        role -> Text,
        first_name -> Varchar,
        last_name -> Varchar,
        /// Lower-cased login name, unique via `uq_users_username`.
        username -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Public half of the current API key.
        api_key_id -> Nullable<Varchar>,
        /// SHA-256 hex digest of the API key secret.
        api_key_hash -> Nullable<Varchar>,
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Car manufacturers.
    car_manufacturers (id) {
        id -> Uuid,
        name -> Varchar,
        slug -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Car models, each belonging to one manufacturer.
    car_models (id) {
        id -> Uuid,
        name -> Varchar,
        slug -> Varchar,
        /// Restricting reference to `car_manufacturers.id`.
        manufacturer_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Cars listed for sale. Rows are soft deleted via `deleted_at`.
    cars (id) {
        id -> Uuid,
        year -> Int4,
        color -> Varchar,
        km_driven -> Int4,
        /// Whole currency units.
        price -> Int8,
        /// Restricting reference to `car_models.id`.
        model_id -> Uuid,
        /// Cascading reference to `users.id`.
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        deleted_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Favourite cars per user.
    user_favorite_cars (user_id, car_id) {
        user_id -> Uuid,
        car_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(car_models -> car_manufacturers (manufacturer_id));
diesel::joinable!(cars -> car_models (model_id));
diesel::joinable!(cars -> users (created_by));
diesel::joinable!(user_favorite_cars -> cars (car_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    car_manufacturers,
    car_models,
    cars,
    user_favorite_cars,
);
