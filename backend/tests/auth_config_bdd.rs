//! Behaviour tests for authentication configuration.
//!
//! These scenarios validate that release builds enforce explicit toggles and
//! strong, distinct token secrets, while debug builds fall back to defaults.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use actix_web::cookie::SameSite;
use carmarket::server::{AuthConfigError, AuthSettings, BuildMode, auth_settings_from_env};
use mockable::MockEnv;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::{NamedTempFile, TempDir};

const ACCESS_SECRET_FILE: &str = "JWT_ACCESS_SECRET_FILE";
const REFRESH_SECRET_FILE: &str = "JWT_REFRESH_SECRET_FILE";

struct AuthConfigWorld {
    vars: RefCell<HashMap<String, String>>,
    mode: RefCell<BuildMode>,
    outcome: RefCell<Option<Result<AuthSettings, AuthConfigError>>>,
    files: RefCell<Vec<NamedTempFile>>,
    dirs: RefCell<Vec<TempDir>>,
}

impl AuthConfigWorld {
    fn new() -> Self {
        Self {
            vars: RefCell::new(HashMap::new()),
            mode: RefCell::new(BuildMode::Release),
            outcome: RefCell::new(None),
            files: RefCell::new(Vec::new()),
            dirs: RefCell::new(Vec::new()),
        }
    }

    fn set_env_var(&self, name: &str, value: &str) {
        self.vars
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn add_secret_file(&self, variable: &str, fill: u8, len: usize) {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&vec![fill; len]).expect("secret written");
        let path = file.path().to_string_lossy().into_owned();
        self.set_env_var(variable, &path);
        self.files.borrow_mut().push(file);
    }

    fn evaluate(&self) {
        let vars = self.vars.borrow().clone();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        let mode = *self.mode.borrow();
        *self.outcome.borrow_mut() = Some(auth_settings_from_env(&env, mode));
    }

    fn with_settings<F>(&self, f: F)
    where
        F: FnOnce(&AuthSettings),
    {
        let outcome = self.outcome.borrow();
        match outcome.as_ref().expect("evaluation result") {
            Ok(settings) => f(settings),
            Err(error) => panic!("expected settings to load, got {error}"),
        }
    }

    fn with_error<F>(&self, f: F)
    where
        F: FnOnce(&AuthConfigError),
    {
        let outcome = self.outcome.borrow();
        match outcome.as_ref().expect("evaluation result") {
            Ok(_) => panic!("expected settings to fail"),
            Err(error) => f(error),
        }
    }
}

#[fixture]
fn world() -> AuthConfigWorld {
    AuthConfigWorld::new()
}

#[given("a release build configuration")]
fn a_release_build_configuration(world: &AuthConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Release;
}

#[given("a debug build configuration")]
fn a_debug_build_configuration(world: &AuthConfigWorld) {
    *world.mode.borrow_mut() = BuildMode::Debug;
}

#[given("{name} is set to {value}")]
fn variable_is_set(world: &AuthConfigWorld, name: String, value: String) {
    world.set_env_var(&name, &value);
}

#[given("distinct secret files with {len} bytes")]
fn distinct_secret_files(world: &AuthConfigWorld, len: usize) {
    world.add_secret_file(ACCESS_SECRET_FILE, b'a', len);
    world.add_secret_file(REFRESH_SECRET_FILE, b'r', len);
}

#[given("identical secret files with {len} bytes")]
fn identical_secret_files(world: &AuthConfigWorld, len: usize) {
    world.add_secret_file(ACCESS_SECRET_FILE, b's', len);
    world.add_secret_file(REFRESH_SECRET_FILE, b's', len);
}

#[given("secret files that do not exist")]
fn secret_files_that_do_not_exist(world: &AuthConfigWorld) {
    let dir = TempDir::new().expect("temp dir");
    for variable in [ACCESS_SECRET_FILE, REFRESH_SECRET_FILE] {
        let path = dir.path().join(variable.to_lowercase());
        world.set_env_var(variable, &path.to_string_lossy());
    }
    world.dirs.borrow_mut().push(dir);
}

#[when("the authentication configuration is loaded")]
fn the_authentication_configuration_is_loaded(world: &AuthConfigWorld) {
    world.evaluate();
}

#[then("the configuration load succeeds")]
fn the_configuration_load_succeeds(world: &AuthConfigWorld) {
    world.with_settings(|_| {});
}

#[then("the refresh cookie is secure with SameSite Strict")]
fn cookie_is_secure_and_strict(world: &AuthConfigWorld) {
    world.with_settings(|settings| {
        assert!(settings.refresh_cookie.secure);
        assert_eq!(settings.refresh_cookie.same_site, SameSite::Strict);
    });
}

#[then("the refresh cookie is secure with SameSite Lax")]
fn cookie_is_secure_and_lax(world: &AuthConfigWorld) {
    world.with_settings(|settings| {
        assert!(settings.refresh_cookie.secure);
        assert_eq!(settings.refresh_cookie.same_site, SameSite::Lax);
    });
}

#[then("the configuration load fails because the secrets are shared")]
fn fails_shared_secret(world: &AuthConfigWorld) {
    world.with_error(|error| assert!(matches!(error, AuthConfigError::SharedSecret)));
}

#[then("the configuration load fails because a secret is too short")]
fn fails_short_secret(world: &AuthConfigWorld) {
    world.with_error(|error| {
        assert!(matches!(
            error,
            AuthConfigError::SecretTooShort {
                length: 16,
                min_len: 32,
                ..
            }
        ));
    });
}

#[then("the configuration load fails because SameSite None requires a secure cookie")]
fn fails_insecure_same_site_none(world: &AuthConfigWorld) {
    world.with_error(|error| assert!(matches!(error, AuthConfigError::InsecureSameSiteNone)));
}

#[then("the configuration load fails because ephemeral secrets are not allowed")]
fn fails_ephemeral_not_allowed(world: &AuthConfigWorld) {
    world.with_error(|error| assert!(matches!(error, AuthConfigError::EphemeralNotAllowed)));
}

#[scenario(path = "tests/features/auth_config.feature", index = 0)]
fn release_build_with_explicit_settings(world: AuthConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/auth_config.feature", index = 1)]
fn release_build_rejects_shared_secret(world: AuthConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/auth_config.feature", index = 2)]
fn release_build_rejects_short_secret(world: AuthConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/auth_config.feature", index = 3)]
fn release_build_rejects_insecure_same_site_none(world: AuthConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/auth_config.feature", index = 4)]
fn release_build_refuses_ephemeral_secrets(world: AuthConfigWorld) {
    drop(world);
}

#[scenario(path = "tests/features/auth_config.feature", index = 5)]
fn debug_build_falls_back_to_defaults(world: AuthConfigWorld) {
    drop(world);
}
