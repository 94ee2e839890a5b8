//! Named constraints and the domain messages they translate to.
//!
//! Constraint names are fixed by the migrations; keep this table in step with
//! them.

/// Message for one named constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConstraintMessage {
    pub name: &'static str,
    /// Raised when an insert or update violates the constraint.
    pub violated: &'static str,
    /// Raised when deleting a row a foreign key still points at.
    pub still_referenced: Option<&'static str>,
}

const fn violation(name: &'static str, violated: &'static str) -> ConstraintMessage {
    ConstraintMessage {
        name,
        violated,
        still_referenced: None,
    }
}

const fn foreign_key(
    name: &'static str,
    missing: &'static str,
    still_referenced: &'static str,
) -> ConstraintMessage {
    ConstraintMessage {
        name,
        violated: missing,
        still_referenced: Some(still_referenced),
    }
}

const CONSTRAINTS: &[ConstraintMessage] = &[
    violation("uq_users_username", "username already taken"),
    violation("uq_users_api_key_id", "API key id already in use"),
    violation("uq_car_manufacturers_name", "manufacturer name already exists"),
    violation("uq_car_manufacturers_slug", "manufacturer slug already exists"),
    violation("uq_car_models_name", "model name already exists"),
    violation("uq_car_models_slug", "model slug already exists"),
    foreign_key(
        "fk_car_models_manufacturer",
        "manufacturer not found",
        "manufacturer still has models",
    ),
    foreign_key("fk_cars_model", "model not found", "model is still referenced by cars"),
    foreign_key("fk_cars_created_by", "user not found", "user still owns cars"),
    foreign_key(
        "user_favorite_cars_car_id_fkey",
        "car not found",
        "car is still favourited",
    ),
    foreign_key(
        "user_favorite_cars_user_id_fkey",
        "user not found",
        "user still has favourites",
    ),
    violation("ck_users_role", "role must be admin or user"),
    violation("ck_cars_year", "year is out of range"),
    violation("ck_cars_price", "price is out of range"),
    violation("ck_cars_km_driven", "kilometres driven is out of range"),
];

/// Look up the message registered for `name`.
pub(crate) fn lookup(name: &str) -> Option<&'static ConstraintMessage> {
    CONSTRAINTS.iter().find(|entry| entry.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("uq_users_username", "username already taken")]
    #[case("fk_cars_model", "model not found")]
    #[case("ck_cars_price", "price is out of range")]
    fn known_constraints_resolve(#[case] name: &str, #[case] expected: &str) {
        let entry = lookup(name).expect("registered constraint");
        assert_eq!(entry.violated, expected);
    }

    #[rstest]
    fn restricting_keys_carry_a_referenced_message() {
        let entry = lookup("fk_car_models_manufacturer").expect("registered constraint");
        assert_eq!(entry.still_referenced, Some("manufacturer still has models"));
    }

    #[rstest]
    fn unknown_constraints_are_absent() {
        assert!(lookup("uq_nonexistent").is_none());
    }
}
