//! Shared helpers for Diesel repository implementations.
//!
//! This module provides:
//! - Error classification from pool and Diesel failures into
//!   [`RepositoryError`], using SQLSTATE classes and the named-constraint
//!   table in [`super::constraints`].
//! - Pagination and `LIKE` pattern helpers shared by list queries.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use pagination::PageRequest;
use tracing::{debug, warn};

use crate::domain::ports::RepositoryError;

use super::constraints;
use super::pool::PoolError;

/// Map pool errors to repository connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

fn constraint_entry(
    info: &dyn DatabaseErrorInformation,
) -> Option<&'static constraints::ConstraintMessage> {
    info.constraint_name().and_then(constraints::lookup)
}

/// PostgreSQL phrases a restricting delete as "update or delete on table".
fn is_still_referenced(info: &dyn DatabaseErrorInformation) -> bool {
    info.message().starts_with("update or delete on table")
}

fn map_unique_violation(info: &dyn DatabaseErrorInformation) -> RepositoryError {
    match constraint_entry(info) {
        Some(entry) => RepositoryError::conflict(entry.violated),
        None => {
            warn!(
                constraint_name = ?info.constraint_name(),
                "unrecognised unique violation - may need specific error mapping"
            );
            RepositoryError::conflict("resource already exists")
        }
    }
}

fn map_foreign_key_violation(info: &dyn DatabaseErrorInformation) -> RepositoryError {
    let entry = constraint_entry(info);
    if is_still_referenced(info) {
        let message = entry
            .and_then(|found| found.still_referenced)
            .unwrap_or("resource is still referenced");
        return RepositoryError::conflict(message);
    }
    match entry {
        Some(found) => RepositoryError::missing_reference(found.violated),
        None => {
            warn!(
                constraint_name = ?info.constraint_name(),
                "unrecognised foreign key violation - may need specific error mapping"
            );
            RepositoryError::missing_reference("referenced resource not found")
        }
    }
}

fn map_rule_violation(info: &dyn DatabaseErrorInformation, fallback: &str) -> RepositoryError {
    let message = constraint_entry(info).map_or(fallback, |entry| entry.violated);
    RepositoryError::constraint_violation(message)
}

/// Deadlocks (40P01) have no dedicated Diesel kind; the server message is
/// stable across PostgreSQL versions.
fn is_deadlock(info: &dyn DatabaseErrorInformation) -> bool {
    info.message().contains("deadlock detected")
}

/// Map Diesel errors to repository errors.
pub(crate) fn map_diesel_error(error: DieselError) -> RepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = ?info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => map_unique_violation(info.as_ref()),
            DatabaseErrorKind::ForeignKeyViolation => map_foreign_key_violation(info.as_ref()),
            DatabaseErrorKind::CheckViolation => {
                map_rule_violation(info.as_ref(), "value violates a check constraint")
            }
            DatabaseErrorKind::NotNullViolation => {
                map_rule_violation(info.as_ref(), "required value is missing")
            }
            DatabaseErrorKind::SerializationFailure => {
                RepositoryError::retryable("serialization failure")
            }
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand => {
                RepositoryError::connection("database connection error")
            }
            _ if is_deadlock(info.as_ref()) => RepositoryError::retryable("deadlock detected"),
            _ => RepositoryError::query("database error"),
        },
        _ => RepositoryError::query("database error"),
    }
}

/// Escape `%`, `_`, and `\` so user input matches literally in `LIKE`.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Case-insensitive substring pattern for `ILIKE`.
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// `LIMIT` and `OFFSET` for a page request.
pub(crate) fn limit_offset(page: PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (i64::from(page.limit()), offset)
}

/// Convert a `COUNT(*)` result into the unsigned total used by pages.
pub(crate) fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    //! Classification coverage for SQLSTATE-derived error kinds.
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct FakeInfo {
        message: &'static str,
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for FakeInfo {
        fn message(&self) -> &str {
            self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(
        kind: DatabaseErrorKind,
        message: &'static str,
        constraint: Option<&'static str>,
    ) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(FakeInfo { message, constraint }))
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, RepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn duplicate_username_is_translated() {
        let err = map_diesel_error(db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"uq_users_username\"",
            Some("uq_users_username"),
        ));
        assert_eq!(err, RepositoryError::conflict("username already taken"));
    }

    #[rstest]
    fn insert_with_unknown_manufacturer_is_missing_reference() {
        let err = map_diesel_error(db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "insert or update on table \"car_models\" violates foreign key constraint \"fk_car_models_manufacturer\"",
            Some("fk_car_models_manufacturer"),
        ));
        assert_eq!(err, RepositoryError::missing_reference("manufacturer not found"));
    }

    #[rstest]
    fn deleting_referenced_manufacturer_is_conflict() {
        let err = map_diesel_error(db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "update or delete on table \"car_manufacturers\" violates foreign key constraint \"fk_car_models_manufacturer\" on table \"car_models\"",
            Some("fk_car_models_manufacturer"),
        ));
        assert_eq!(err, RepositoryError::conflict("manufacturer still has models"));
    }

    #[rstest]
    #[case(DatabaseErrorKind::CheckViolation, Some("ck_cars_year"), "year is out of range")]
    #[case(DatabaseErrorKind::CheckViolation, None, "value violates a check constraint")]
    #[case(DatabaseErrorKind::NotNullViolation, None, "required value is missing")]
    fn rule_violations_are_invalid_input(
        #[case] kind: DatabaseErrorKind,
        #[case] constraint: Option<&'static str>,
        #[case] expected: &str,
    ) {
        let err = map_diesel_error(db_error(kind, "violation", constraint));
        assert_eq!(err, RepositoryError::constraint_violation(expected));
    }

    #[rstest]
    #[case(DatabaseErrorKind::SerializationFailure, "could not serialize access")]
    #[case(DatabaseErrorKind::Unknown, "deadlock detected")]
    fn transient_failures_are_retryable(#[case] kind: DatabaseErrorKind, #[case] message: &'static str) {
        let err = map_diesel_error(db_error(kind, message, None));
        assert!(matches!(err, RepositoryError::Retryable { .. }));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, RepositoryError::Query { .. }));
    }

    #[rstest]
    #[case("50%_off", "50\\%\\_off")]
    #[case("plain", "plain")]
    #[case("back\\slash", "back\\\\slash")]
    fn like_wildcards_are_escaped(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_like(input), expected);
    }

    #[rstest]
    fn limit_offset_follows_page() {
        let page = PageRequest::new(3, 25).expect("valid page");
        assert_eq!(limit_offset(page), (25, 50));
    }
}
