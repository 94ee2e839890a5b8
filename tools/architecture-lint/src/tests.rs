//! Unit tests for the layering rules.

use std::path::{Path, PathBuf};

use rstest::rstest;

use super::*;

fn lint_one(file: &str, contents: &str) -> Result<(), ArchitectureLintError> {
    lint_sources(&[LintSource {
        file: PathBuf::from(file),
        contents: contents.to_owned(),
    }])
}

#[rstest]
#[case(
    "inbound/http/cars.rs",
    "use crate::domain::catalog::CarId; fn handler() { let _ = CarId::random(); }",
    true
)]
#[case(
    "inbound/http/cars.rs",
    "use crate::outbound::persistence::DieselCarRepository; fn handler() { let _ = DieselCarRepository::new; }",
    false
)]
#[case(
    "inbound/trpc/procedures.rs",
    "use outbound::persistence::DbPool; fn handler() { let _ = DbPool::new; }",
    false
)]
#[case(
    "inbound/http/users.rs",
    "use carmarket::outbound::security::JwtTokenService; fn handler() { let _ = JwtTokenService::new; }",
    false
)]
#[case(
    "inbound/http/auth.rs",
    "use crate::server::ServerConfig; fn handler() { let _ = ServerConfig::new; }",
    false
)]
#[case(
    "inbound/http/manufacturers.rs",
    "use diesel::prelude::*; fn handler() {}",
    false
)]
#[case(
    "domain/catalog/car.rs",
    "use crate::inbound::http; fn thing() { let _ = 1; }",
    false
)]
#[case(
    "domain/auth_service.rs",
    "fn verify() { let _ = argon2::Argon2::default(); }",
    false
)]
#[case(
    "domain/catalog/manufacturer.rs",
    "use utoipa::ToSchema; #[derive(ToSchema)] struct Foo;",
    false
)]
#[case(
    "domain/user.rs",
    "use super::error::Error; use pagination::PageRequest; fn thing(_: PageRequest) -> Option<Error> { None }",
    true
)]
#[case(
    "outbound/persistence/diesel_car_repository.rs",
    "use crate::inbound::http; fn thing() { let _ = 1; }",
    false
)]
#[case(
    "outbound/security/jwt_token_service.rs",
    "use actix_web::HttpResponse; fn thing() { let _ = HttpResponse::Ok(); }",
    false
)]
#[case(
    "middleware/throttle.rs",
    "use actix_web::dev::Service; use crate::domain::Error; fn thing(_: Error) {}",
    true
)]
#[case(
    "middleware/trace.rs",
    "use crate::outbound::persistence::DbPool; fn thing(_: DbPool) {}",
    false
)]
fn applies_layer_rules(#[case] file: &str, #[case] contents: &str, #[case] ok: bool) {
    let result = lint_one(file, contents);
    assert_eq!(result.is_ok(), ok, "result: {result:?}");
}

#[rstest]
fn reports_every_rule_a_file_breaks() {
    let result = lint_one(
        "domain/catalog/car.rs",
        "use crate::outbound::persistence::DbPool; use diesel::prelude::*; fn thing(_: DbPool) {}",
    );

    let Err(ArchitectureLintError::Violations(violations)) = result else {
        panic!("expected violations, got {result:?}");
    };
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "domain module must not depend on crate::outbound",
            "domain module must not depend on external crate `diesel`",
        ]
    );
}

#[rstest]
fn files_outside_a_layer_are_rejected() {
    let result = lint_one("server/mod.rs", "fn main() {}");

    assert!(matches!(
        result,
        Err(ArchitectureLintError::UnknownLayer { ref file }) if file == Path::new("server/mod.rs")
    ));
}

#[rstest]
fn unparsable_sources_surface_a_parse_error() {
    let result = lint_one("domain/user.rs", "fn broken( {");

    assert!(matches!(result, Err(ArchitectureLintError::Parse { .. })));
}

#[rstest]
#[case(&["crate", "outbound", "persistence"], Some(Reference::Module("outbound")))]
#[case(&["super", "super", "server", "config"], Some(Reference::Module("server")))]
#[case(&["carmarket", "inbound", "http"], Some(Reference::Module("inbound")))]
#[case(&["super", "envelope", "created"], None)]
#[case(&["diesel", "prelude"], Some(Reference::Crate("diesel")))]
fn classifies_references(#[case] raw: &[&str], #[case] expected: Option<Reference<'static>>) {
    let segments: Vec<String> = raw.iter().map(|s| (*s).to_owned()).collect();

    assert_eq!(Reference::of(&segments), expected);
}

#[rstest]
#[case("domain/catalog/car.rs", Some(Layer::Domain))]
#[case("middleware/throttle.rs", Some(Layer::Middleware))]
#[case("outbound/security/mod.rs", Some(Layer::Outbound))]
#[case("server/mod.rs", None)]
#[case("lib.rs", None)]
fn classifies_files_by_layer(#[case] file: &str, #[case] expected: Option<Layer>) {
    assert_eq!(Layer::of_file(Path::new(file)), expected);
}
