//! Handler tests for manufacturer routes.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockall::predicate::eq;
use pagination::Page;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::Error;
use crate::domain::ports::{MockAuthenticator, MockManufacturerCatalog};
use crate::domain::test_fixtures::{admin, manufacturer, member};
use crate::inbound::http::test_utils::{StateBuilder, bearer_auth};
use crate::inbound::http::validation::json_config;

const TOKEN: &str = "token";

async fn call(
    auth: MockAuthenticator,
    manufacturers: MockManufacturerCatalog,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let state = StateBuilder::default()
        .auth(auth)
        .manufacturers(manufacturers)
        .build();
    let app = test::init_service(
        App::new()
            .app_data(state)
            .app_data(json_config())
            .service(web::scope("/api/v1").configure(configure)),
    )
    .await;
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    (status, test::read_body_json(res).await)
}

fn authorised(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("authorization", format!("Bearer {TOKEN}")))
}

#[actix_web::test]
async fn list_is_public_and_applies_defaults() {
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_list()
        .withf(|filter, page| {
            filter.search.is_none()
                && filter.sort == ManufacturerSort::Name
                && filter.order == SortOrder::Asc
                && page.page() == 1
                && page.limit() == pagination::DEFAULT_LIMIT
        })
        .times(1)
        .returning(|_, page| Ok(Page::new(vec![manufacturer()], page, 1)));

    let (status, body) = call(
        MockAuthenticator::new(),
        manufacturers,
        test::TestRequest::get().uri("/api/v1/manufacturers"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["slug"], json!("volkswagen"));
    assert_eq!(body["data"]["meta"]["totalPages"], json!(1));
}

#[actix_web::test]
async fn list_passes_search_and_sort() {
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_list()
        .withf(|filter, _| {
            filter.search.as_deref() == Some("volk")
                && filter.sort == ManufacturerSort::CreatedAt
                && filter.order == SortOrder::Desc
        })
        .times(1)
        .returning(|_, page| Ok(Page::new(Vec::new(), page, 0)));

    let (status, _) = call(
        MockAuthenticator::new(),
        manufacturers,
        test::TestRequest::get()
            .uri("/api/v1/manufacturers?search=%20volk%20&sort=createdAt&order=desc"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[case("/api/v1/manufacturers?sort=founded", "sort", "invalid_enum_value")]
#[case("/api/v1/manufacturers?page=0", "page", "too_small")]
#[case("/api/v1/manufacturers?colour=red", "colour", "unrecognized_key")]
#[actix_web::test]
async fn list_rejects_invalid_query(#[case] uri: &str, #[case] path: &str, #[case] code: &str) {
    let (status, body) = call(
        MockAuthenticator::new(),
        MockManufacturerCatalog::new(),
        test::TestRequest::get().uri(uri),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["issues"][0]["path"], json!([path]));
    assert_eq!(body["error"]["issues"][0]["code"], json!(code));
}

#[actix_web::test]
async fn get_reports_not_found() {
    let id = ManufacturerId::random();
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_get()
        .with(eq(id))
        .times(1)
        .returning(|_| Err(Error::not_found("manufacturer not found")));

    let (status, body) = call(
        MockAuthenticator::new(),
        manufacturers,
        test::TestRequest::get().uri(&format!("/api/v1/manufacturers/{id}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["errorCode"], json!(4040));
}

#[actix_web::test]
async fn create_requires_credentials() {
    let (status, body) = call(
        MockAuthenticator::new(),
        MockManufacturerCatalog::new(),
        test::TestRequest::post()
            .uri("/api/v1/manufacturers")
            .set_json(json!({"name": "Volkswagen"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], json!("unauthorized"));
}

#[actix_web::test]
async fn create_derives_slug_and_returns_201() {
    let caller = admin();
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_create()
        .withf(move |principal, new| {
            *principal == caller
                && new.name.as_ref() == "Alfa Romeo"
                && new.slug.as_ref() == "alfa-romeo"
        })
        .times(1)
        .returning(|_, _| Ok(manufacturer()));

    let (status, body) = call(
        bearer_auth(TOKEN, caller),
        manufacturers,
        authorised(
            test::TestRequest::post()
                .uri("/api/v1/manufacturers")
                .set_json(json!({"name": "  Alfa Romeo "})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
}

#[actix_web::test]
async fn create_reports_name_and_slug_together() {
    let (status, body) = call(
        bearer_auth(TOKEN, admin()),
        MockManufacturerCatalog::new(),
        authorised(
            test::TestRequest::post()
                .uri("/api/v1/manufacturers")
                .set_json(json!({"name": "", "slug": "Not A Slug"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["issues"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn member_create_maps_forbidden() {
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_create()
        .returning(|_, _| Err(Error::forbidden("admin role required")));
    let (status, _) = call(
        bearer_auth(TOKEN, member()),
        manufacturers,
        authorised(
            test::TestRequest::post()
                .uri("/api/v1/manufacturers")
                .set_json(json!({"name": "Skoda"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn update_rejects_empty_body() {
    let (status, body) = call(
        bearer_auth(TOKEN, admin()),
        MockManufacturerCatalog::new(),
        authorised(
            test::TestRequest::patch()
                .uri(&format!("/api/v1/manufacturers/{}", ManufacturerId::random()))
                .set_json(json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["issues"][0]["path"], json!(["body"]));
}

#[actix_web::test]
async fn update_passes_slug_change() {
    let id = ManufacturerId::random();
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_update()
        .withf(move |_, target, changes| {
            *target == id
                && changes.name().is_none()
                && changes.slug().map(AsRef::as_ref) == Some("vw")
        })
        .times(1)
        .returning(|_, _, _| Ok(manufacturer()));
    let (status, _) = call(
        bearer_auth(TOKEN, admin()),
        manufacturers,
        authorised(
            test::TestRequest::patch()
                .uri(&format!("/api/v1/manufacturers/{id}"))
                .set_json(json!({"slug": "vw"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn delete_with_models_is_a_conflict() {
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_delete()
        .returning(|_, _| Err(Error::conflict("manufacturer still has models")));
    let (status, body) = call(
        bearer_auth(TOKEN, admin()),
        manufacturers,
        authorised(
            test::TestRequest::delete()
                .uri(&format!("/api/v1/manufacturers/{}", ManufacturerId::random())),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], json!("manufacturer still has models"));
}
