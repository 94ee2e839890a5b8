//! Tests for the car listing service.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::catalog::{CarModelId, Color, Kilometres, ModelYear, Price};
use crate::domain::ports::{MockCarRepository, RepositoryError};
use crate::domain::test_fixtures::{admin, car_owned_by, fixed_time, member};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        fixed_time().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        fixed_time()
    }
}

fn service(repo: MockCarRepository) -> CarListingService<MockCarRepository> {
    CarListingService::new(Arc::new(repo), Arc::new(FixtureClock))
}

#[fixture]
fn new_car() -> NewCar {
    NewCar {
        year: ModelYear::from_stored(2021),
        color: Color::new("red").expect("valid color"),
        km_driven: Kilometres::new(12_000).expect("valid km"),
        price: Price::new(21_000).expect("valid price"),
        model_id: CarModelId::random(),
    }
}

#[rstest]
#[tokio::test]
async fn create_assigns_principal_as_owner(new_car: NewCar) {
    let principal = member();
    let owner = principal.user_id();
    let mut repo = MockCarRepository::new();
    repo.expect_insert()
        .withf(move |_, candidate| *candidate == owner)
        .times(1)
        .return_once(move |_, owner| Ok(car_owned_by(owner)));

    let car = service(repo)
        .create(&principal, new_car)
        .await
        .expect("created");
    assert_eq!(car.created_by, owner);
}

#[rstest]
#[case::owner(true, false, None)]
#[case::admin(false, true, None)]
#[case::stranger(false, false, Some(ErrorCode::Forbidden))]
#[tokio::test]
async fn delete_enforces_ownership(
    #[case] is_owner: bool,
    #[case] is_admin: bool,
    #[case] expected: Option<ErrorCode>,
) {
    let principal = if is_admin { admin() } else { member() };
    let owner = if is_owner {
        principal.user_id()
    } else {
        crate::domain::UserId::random()
    };
    let car = car_owned_by(owner);
    let id = car.id;
    let mut repo = MockCarRepository::new();
    repo.expect_find_active()
        .times(1)
        .return_once(move |_| Ok(Some(car)));
    let allowed = expected.is_none();
    repo.expect_soft_delete()
        .withf(|_, at| *at == fixed_time())
        .times(usize::from(allowed))
        .returning(|_, _| Ok(true));

    let result = service(repo).delete(&principal, id).await;
    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[tokio::test]
async fn updating_deleted_car_is_not_found() {
    let mut repo = MockCarRepository::new();
    repo.expect_find_active().times(1).return_once(|_| Ok(None));
    repo.expect_update().never();
    let changes = CarChanges {
        price: Some(Price::new(1).expect("valid")),
        ..CarChanges::default()
    };

    let err = service(repo)
        .update(&admin(), CarId::random(), changes)
        .await
        .expect_err("missing car");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn favouriting_missing_car_is_not_found() {
    let mut repo = MockCarRepository::new();
    repo.expect_find_active().times(1).return_once(|_| Ok(None));
    repo.expect_add_favorite().never();

    let err = service(repo)
        .add_favorite(&member(), CarId::random())
        .await
        .expect_err("missing car");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn favouriting_twice_is_idempotent() {
    let principal = member();
    let car = car_owned_by(crate::domain::UserId::random());
    let id = car.id;
    let mut repo = MockCarRepository::new();
    repo.expect_find_active()
        .times(2)
        .returning(move |_| Ok(Some(car.clone())));
    repo.expect_add_favorite().times(2).returning(|_, _| Ok(()));

    let svc = service(repo);
    svc.add_favorite(&principal, id).await.expect("first add");
    svc.add_favorite(&principal, id).await.expect("second add");
}

#[tokio::test]
async fn removing_unknown_favourite_succeeds() {
    let mut repo = MockCarRepository::new();
    repo.expect_remove_favorite().times(1).return_once(|_, _| Ok(()));

    service(repo)
        .remove_favorite(&member(), CarId::random())
        .await
        .expect("no-op removal");
}

#[tokio::test]
async fn inverted_price_range_is_rejected_before_querying() {
    let mut repo = MockCarRepository::new();
    repo.expect_list().never();
    let filter = CarFilter {
        price_min: Some(5_000),
        price_max: Some(1_000),
        ..CarFilter::default()
    };

    let err = service(repo)
        .list(filter, PageRequest::default())
        .await
        .expect_err("inverted range");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.issues().len(), 1);
}

#[tokio::test]
async fn deadlocks_surface_as_service_unavailable() {
    let mut repo = MockCarRepository::new();
    repo.expect_list_favorites()
        .times(1)
        .return_once(|_, _| Err(RepositoryError::retryable("deadlock detected")));

    let err = service(repo)
        .favorites(&member(), PageRequest::default())
        .await
        .expect_err("retryable");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
