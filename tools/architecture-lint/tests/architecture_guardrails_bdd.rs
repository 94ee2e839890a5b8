//! Behaviour tests for the layering lint, run against a backend tree on disk.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use architecture_lint::{ArchitectureLintError, Violation, lint_backend_sources};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

const CAR_ID: &str = "pub struct CarId(uuid::Uuid); \
    impl CarId { pub fn random() -> Self { Self(uuid::Uuid::new_v4()) } }";
const CARS_HANDLER: &str = "use actix_web::web; use crate::domain::catalog::car::CarId; \
    fn handler(_: web::Path<String>) { let _id = CarId::random(); }";
const TRACE_MIDDLEWARE: &str = "use actix_web::dev::ServiceRequest; use crate::domain::TraceId; \
    fn tag(_: &ServiceRequest, _: TraceId) {}";
const CAR_REPOSITORY: &str = "use diesel::prelude::*; use crate::domain::catalog::car::CarId; \
    pub struct Repo; impl Repo { pub fn save(&self, _id: CarId) {} }";
const HANDLER_USING_REPOSITORY: &str =
    "use carmarket::outbound::persistence::DieselCarRepository; \
    fn handler() { let _ = DieselCarRepository::new; }";
const DOMAIN_USING_ACTIX: &str =
    "use actix_web::HttpResponse; fn handler() { let _ = HttpResponse::Ok(); }";

/// A scratch `backend/src` tree and the outcome of linting it.
struct LintWorld {
    root: TempDir,
    outcome: RefCell<Option<Result<(), ArchitectureLintError>>>,
}

impl LintWorld {
    fn backend_dir(&self) -> PathBuf {
        self.root.path().join("backend")
    }

    fn write(&self, file: &str, contents: &str) {
        let path = self.backend_dir().join("src").join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("source directories created");
        }
        fs::write(path, contents).expect("source written");
    }

    fn write_layered_modules(&self) {
        self.write("domain/catalog/car.rs", CAR_ID);
        self.write("inbound/http/cars.rs", CARS_HANDLER);
        self.write("middleware/trace.rs", TRACE_MIDDLEWARE);
        self.write("outbound/persistence/diesel_car_repository.rs", CAR_REPOSITORY);
    }

    fn violations(&self) -> Vec<Violation> {
        match self.outcome.borrow().as_ref().expect("lint has run") {
            Err(ArchitectureLintError::Violations(violations)) => violations.clone(),
            other => panic!("expected layering violations, got {other:?}"),
        }
    }

    fn assert_violation(&self, file: &str, fragment: &str) {
        let violations = self.violations();
        assert!(
            violations
                .iter()
                .any(|v| v.file == Path::new(file) && v.message.contains(fragment)),
            "no violation in {file} mentioning {fragment}: {violations:?}"
        );
    }
}

#[fixture]
fn world() -> LintWorld {
    LintWorld {
        root: TempDir::new().expect("temp dir"),
        outcome: RefCell::new(None),
    }
}

#[given("valid domain, inbound, middleware, and outbound modules")]
fn valid_modules(world: &LintWorld) {
    world.write_layered_modules();
}

#[given("an inbound module that imports the outbound layer")]
fn inbound_imports_outbound(world: &LintWorld) {
    world.write("inbound/http/cars.rs", HANDLER_USING_REPOSITORY);
}

#[given("an inbound module that imports Diesel directly")]
fn inbound_imports_diesel(world: &LintWorld) {
    world.write(
        "inbound/http/manufacturers.rs",
        "use diesel::prelude::*; fn handler() {}",
    );
}

#[given("a domain module that imports Actix Web")]
fn domain_imports_actix(world: &LintWorld) {
    world.write("domain/catalog/car.rs", DOMAIN_USING_ACTIX);
}

#[given("a domain module that imports Argon2")]
fn domain_imports_argon2(world: &LintWorld) {
    world.write(
        "domain/auth_service.rs",
        "use argon2::Argon2; fn verify() { let _ = Argon2::default(); }",
    );
}

#[given("an outbound module that imports the inbound layer")]
fn outbound_imports_inbound(world: &LintWorld) {
    world.write(
        "outbound/persistence/diesel_user_repository.rs",
        "use crate::inbound::http::envelope; fn save() { let _ = envelope::created; }",
    );
}

#[given("a middleware module that imports the outbound layer")]
fn middleware_imports_outbound(world: &LintWorld) {
    world.write(
        "middleware/throttle.rs",
        "use crate::outbound::persistence::DbPool; fn limit(_: &DbPool) {}",
    );
}

#[given("valid modules mixed with multiple boundary violations")]
fn valid_modules_with_violations(world: &LintWorld) {
    world.write_layered_modules();
    world.write("inbound/http/users.rs", HANDLER_USING_REPOSITORY);
    world.write("domain/user.rs", DOMAIN_USING_ACTIX);
}

#[when("the architecture lint runs")]
fn lint_runs(world: &LintWorld) {
    let outcome = lint_backend_sources(&world.backend_dir());
    *world.outcome.borrow_mut() = Some(outcome);
}

#[then("the lint succeeds")]
fn lint_succeeds(world: &LintWorld) {
    let outcome = world.outcome.borrow();
    let outcome = outcome.as_ref().expect("lint has run");
    assert!(outcome.is_ok(), "expected a clean tree, got {outcome:?}");
}

#[then("the lint fails")]
fn lint_fails(world: &LintWorld) {
    assert!(!world.violations().is_empty());
}

#[then("the lint fails due to outbound access from inbound")]
fn fails_on_inbound_to_outbound(world: &LintWorld) {
    world.assert_violation("inbound/http/cars.rs", "crate::outbound");
}

#[then("the lint fails due to infrastructure crate usage")]
fn fails_on_diesel_in_inbound(world: &LintWorld) {
    world.assert_violation("inbound/http/manufacturers.rs", "external crate `diesel`");
}

#[then("the lint fails due to framework crate usage in the domain")]
fn fails_on_actix_in_domain(world: &LintWorld) {
    world.assert_violation("domain/catalog/car.rs", "external crate `actix_web`");
}

#[then("the lint fails due to credential crate usage in the domain")]
fn fails_on_argon2_in_domain(world: &LintWorld) {
    world.assert_violation("domain/auth_service.rs", "external crate `argon2`");
}

#[then("the lint fails due to inbound access from outbound")]
fn fails_on_outbound_to_inbound(world: &LintWorld) {
    world.assert_violation(
        "outbound/persistence/diesel_user_repository.rs",
        "crate::inbound",
    );
}

#[then("the lint fails due to outbound access from middleware")]
fn fails_on_middleware_to_outbound(world: &LintWorld) {
    world.assert_violation("middleware/throttle.rs", "crate::outbound");
}

#[then("all boundary violations are reported")]
fn all_violations_reported(world: &LintWorld) {
    assert_eq!(world.violations().len(), 2);
    world.assert_violation("inbound/http/users.rs", "crate::outbound");
    world.assert_violation("domain/user.rs", "external crate `actix_web`");
}

#[scenario(path = "tests/features/architecture_guardrails.feature", index = 0)]
fn layered_modules_pass(world: LintWorld) {
    drop(world);
}

#[scenario(path = "tests/features/architecture_guardrails.feature", index = 1)]
fn inbound_may_not_reach_outbound(world: LintWorld) {
    drop(world);
}

#[scenario(path = "tests/features/architecture_guardrails.feature", index = 2)]
fn inbound_may_not_use_diesel(world: LintWorld) {
    drop(world);
}

#[scenario(path = "tests/features/architecture_guardrails.feature", index = 3)]
fn domain_may_not_use_actix(world: LintWorld) {
    drop(world);
}

#[scenario(path = "tests/features/architecture_guardrails.feature", index = 4)]
fn domain_may_not_hash_passwords(world: LintWorld) {
    drop(world);
}

#[scenario(path = "tests/features/architecture_guardrails.feature", index = 5)]
fn outbound_may_not_call_inbound(world: LintWorld) {
    drop(world);
}

#[scenario(path = "tests/features/architecture_guardrails.feature", index = 6)]
fn middleware_may_not_reach_outbound(world: LintWorld) {
    drop(world);
}

#[scenario(path = "tests/features/architecture_guardrails.feature", index = 7)]
fn every_violation_is_reported(world: LintWorld) {
    drop(world);
}
