//! Tests for the manufacturer and model services.

use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::catalog::CatalogName;
use crate::domain::ports::{MockCarModelRepository, MockManufacturerRepository, RepositoryError};
use crate::domain::test_fixtures::{admin, car_model, manufacturer, member};
use rstest::rstest;

fn manufacturers(repo: MockManufacturerRepository) -> ManufacturerService<MockManufacturerRepository> {
    ManufacturerService::new(Arc::new(repo))
}

fn models(repo: MockCarModelRepository) -> CarModelService<MockCarModelRepository> {
    CarModelService::new(Arc::new(repo))
}

fn new_manufacturer() -> NewManufacturer {
    NewManufacturer::new(CatalogName::new("Skoda").expect("valid"), None).expect("derivable")
}

#[tokio::test]
async fn get_returns_not_found_for_missing_manufacturer() {
    let mut repo = MockManufacturerRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let err = manufacturers(repo)
        .get(ManufacturerId::random())
        .await
        .expect_err("missing manufacturer");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn create_requires_admin() {
    let mut repo = MockManufacturerRepository::new();
    repo.expect_insert().never();

    let err = manufacturers(repo)
        .create(&member(), new_manufacturer())
        .await
        .expect_err("members cannot create");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn admin_creates_manufacturer() {
    let stored = manufacturer();
    let expected = stored.clone();
    let mut repo = MockManufacturerRepository::new();
    repo.expect_insert()
        .withf(|new| new.slug.as_ref() == "skoda")
        .times(1)
        .return_once(move |_| Ok(stored));

    let created = manufacturers(repo)
        .create(&admin(), new_manufacturer())
        .await
        .expect("admin may create");
    assert_eq!(created, expected);
}

#[tokio::test]
async fn duplicate_name_surfaces_as_conflict() {
    let mut repo = MockManufacturerRepository::new();
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(RepositoryError::conflict("manufacturer name already exists")));

    let err = manufacturers(repo)
        .create(&admin(), new_manufacturer())
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "manufacturer name already exists");
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn delete_reports_missing_rows(#[case] deleted: bool, #[case] expected: Option<ErrorCode>) {
    let mut repo = MockManufacturerRepository::new();
    repo.expect_delete().times(1).return_once(move |_| Ok(deleted));

    let result = manufacturers(repo)
        .delete(&admin(), ManufacturerId::random())
        .await;
    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[tokio::test]
async fn update_missing_manufacturer_is_not_found() {
    let mut repo = MockManufacturerRepository::new();
    repo.expect_update().times(1).return_once(|_, _| Ok(None));
    let changes =
        ManufacturerChanges::new(Some(CatalogName::new("Seat").expect("valid")), None).expect("changes");

    let err = manufacturers(repo)
        .update(&admin(), ManufacturerId::random(), changes)
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn model_with_unknown_manufacturer_is_not_found() {
    let mut repo = MockCarModelRepository::new();
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(RepositoryError::missing_reference("manufacturer not found")));
    let model = NewCarModel::new(
        CatalogName::new("Octavia").expect("valid"),
        None,
        ManufacturerId::random(),
    )
    .expect("valid model");

    let err = models(repo)
        .create(&admin(), model)
        .await
        .expect_err("unknown manufacturer");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn deleting_referenced_model_is_conflict() {
    let mut repo = MockCarModelRepository::new();
    repo.expect_delete()
        .times(1)
        .return_once(|_| Err(RepositoryError::conflict("car model is still used by cars")));

    let err = models(repo)
        .delete(&admin(), CarModelId::random())
        .await
        .expect_err("referenced");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn model_reads_are_public() {
    let stored = car_model();
    let id = stored.id;
    let mut repo = MockCarModelRepository::new();
    repo.expect_find_by_id()
        .withf(move |candidate| *candidate == id)
        .times(1)
        .return_once(move |_| Ok(Some(stored)));

    let model = models(repo).get(id).await.expect("found");
    assert_eq!(model.id, id);
}

#[tokio::test]
async fn connection_failures_are_service_unavailable() {
    let mut repo = MockManufacturerRepository::new();
    repo.expect_list()
        .times(1)
        .return_once(|_, _| Err(RepositoryError::connection("pool timed out")));

    let err = manufacturers(repo)
        .list(ManufacturerFilter::default(), PageRequest::default())
        .await
        .expect_err("unavailable");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
