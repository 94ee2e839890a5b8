//! End-to-end tests for the tRPC endpoint against mocked ports.

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockall::predicate::eq;
use pagination::{Cursor, Page, PageRequest};
use serde_json::{Value, json};
use zeroize::Zeroizing;

use super::*;
use crate::domain::catalog::{CarId, CarSort, ManufacturerId, SortOrder};
use crate::domain::ports::{
    MockAuthenticator, MockCarListings, MockManufacturerCatalog, MockUserAccounts,
};
use crate::domain::test_fixtures::{admin, car_owned_by, manufacturer, member, user_with_role};
use crate::domain::{AuthSession, Error, Role, TokenPair, UserId};
use crate::inbound::http::test_utils::{StateBuilder, bearer_auth};

const TOKEN: &str = "token";

async fn call(state: web::Data<HttpState>, req: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(web::scope("/trpc").configure(configure)),
    )
    .await;
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    (status, test::read_body_json(res).await)
}

fn input_uri(procedure: &str, input: &Value) -> String {
    format!("/trpc/{procedure}?input={}", url_encode(&input.to_string()))
}

fn url_encode(raw: &str) -> String {
    raw.bytes()
        .map(|byte| match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                char::from(byte).to_string()
            }
            other => format!("%{other:02X}"),
        })
        .collect()
}

fn authorised(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("authorization", format!("Bearer {TOKEN}")))
}

#[actix_web::test]
async fn query_without_input_uses_defaults() {
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_list()
        .withf(|filter, page| filter.search.is_none() && page.page() == 1)
        .times(1)
        .returning(|_, page| Ok(Page::new(vec![manufacturer()], page, 1)));
    let state = StateBuilder::default().manufacturers(manufacturers).build();

    let (status, body) = call(
        state,
        test::TestRequest::get().uri("/trpc/manufacturers.list"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"]["items"][0]["name"], json!("Volkswagen"));
    assert_eq!(body["result"]["data"]["meta"]["total"], json!(1));
}

#[actix_web::test]
async fn query_input_accepts_json_numbers() {
    let mut cars = MockCarListings::new();
    cars.expect_list()
        .withf(|filter, page| {
            filter.year_from == Some(2015)
                && filter.sort == CarSort::Price
                && filter.order == SortOrder::Desc
                && page.limit() == 5
        })
        .times(1)
        .returning(|_, page| Ok(Page::new(Vec::new(), page, 0)));
    let state = StateBuilder::default().cars(cars).build();

    let uri = input_uri(
        "cars.list",
        &json!({"yearFrom": 2015, "sort": "price", "limit": 5}),
    );
    let (status, _) = call(state, test::TestRequest::get().uri(&uri)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn invalid_input_reports_issues_with_path() {
    let uri = input_uri("cars.list", &json!({"yearFrom": 2020, "yearTo": 2010}));
    let (status, body) = call(
        StateBuilder::default().build(),
        test::TestRequest::get().uri(&uri),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["data"]["code"], json!("BAD_REQUEST"));
    assert_eq!(body["error"]["data"]["path"], json!("cars.list"));
    assert_eq!(body["error"]["data"]["issues"][0]["path"], json!(["yearFrom"]));
}

#[actix_web::test]
async fn malformed_input_is_a_parse_error() {
    let (status, body) = call(
        StateBuilder::default().build(),
        test::TestRequest::get().uri("/trpc/cars.list?input=%7Bnope"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["data"]["code"], json!("PARSE_ERROR"));
    assert_eq!(body["error"]["code"], json!(-32700));
}

#[actix_web::test]
async fn unknown_procedure_is_not_found() {
    let (status, body) = call(
        StateBuilder::default().build(),
        test::TestRequest::get().uri("/trpc/cars.explode"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["data"]["code"], json!("NOT_FOUND"));
}

#[actix_web::test]
async fn mutation_over_get_is_method_not_supported() {
    let (status, body) = call(
        StateBuilder::default().build(),
        test::TestRequest::get().uri("/trpc/cars.create"),
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["data"]["code"], json!("METHOD_NOT_SUPPORTED"));
}

#[actix_web::test]
async fn put_is_method_not_supported() {
    let (status, _) = call(
        StateBuilder::default().build(),
        test::TestRequest::put().uri("/trpc/cars.list"),
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn by_id_validates_the_id() {
    let uri = input_uri("manufacturers.byId", &json!({"id": "vw"}));
    let (status, body) = call(
        StateBuilder::default().build(),
        test::TestRequest::get().uri(&uri),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["data"]["issues"][0]["path"], json!(["id"]));
}

#[actix_web::test]
async fn infinite_returns_next_cursor_and_resumes_from_it() {
    let mut cars = MockCarListings::new();
    cars.expect_list()
        .withf(|_, page| page.page() == 1 && page.limit() == 1)
        .times(1)
        .returning(|_, page| Ok(Page::new(vec![car_owned_by(UserId::random())], page, 2)));
    cars.expect_list()
        .withf(|_, page| page.page() == 2 && page.limit() == 1)
        .times(1)
        .returning(|_, page| Ok(Page::new(vec![car_owned_by(UserId::random())], page, 2)));
    let state = StateBuilder::default().cars(cars).build();

    let first = input_uri("cars.infinite", &json!({"limit": 1}));
    let (status, body) = call(state.clone(), test::TestRequest::get().uri(&first)).await;
    assert_eq!(status, StatusCode::OK);
    let cursor = body["result"]["data"]["nextCursor"]
        .as_str()
        .expect("next cursor")
        .to_owned();
    let expected = Cursor::new(PageRequest::new(2, 1).expect("request")).encode();
    assert_eq!(cursor, expected);

    let second = input_uri("cars.infinite", &json!({"limit": 1, "cursor": cursor}));
    let (status, body) = call(state, test::TestRequest::get().uri(&second)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"]["nextCursor"], Value::Null);
    assert_eq!(body["result"]["data"]["items"].as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn protected_query_requires_credentials() {
    let (status, body) = call(
        StateBuilder::default().build(),
        test::TestRequest::get().uri("/trpc/users.me"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["data"]["code"], json!("UNAUTHORIZED"));
    assert_eq!(body["error"]["code"], json!(-32001));
}

#[actix_web::test]
async fn me_resolves_the_caller() {
    let caller = member();
    let mut users = MockUserAccounts::new();
    users
        .expect_me()
        .with(eq(caller))
        .times(1)
        .returning(|_| Ok(user_with_role(Role::User)));
    let state = StateBuilder::default()
        .auth(bearer_auth(TOKEN, caller))
        .users(users)
        .build();

    let (status, body) = call(
        state,
        authorised(test::TestRequest::get().uri("/trpc/users.me")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"]["role"], json!("user"));
}

#[actix_web::test]
async fn update_mutation_splits_id_from_changes() {
    let id = ManufacturerId::random();
    let mut manufacturers = MockManufacturerCatalog::new();
    manufacturers
        .expect_update()
        .withf(move |_, target, changes| {
            *target == id && changes.slug().map(AsRef::as_ref) == Some("vw")
        })
        .times(1)
        .returning(|_, _, _| Ok(manufacturer()));
    let state = StateBuilder::default()
        .auth(bearer_auth(TOKEN, admin()))
        .manufacturers(manufacturers)
        .build();

    let (status, body) = call(
        state,
        authorised(
            test::TestRequest::post()
                .uri("/trpc/manufacturers.update")
                .set_json(json!({"id": id.to_string(), "slug": "vw"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"]["slug"], json!("volkswagen"));
}

#[actix_web::test]
async fn add_favorite_acknowledges() {
    let caller = member();
    let car = CarId::random();
    let mut cars = MockCarListings::new();
    cars.expect_add_favorite()
        .with(eq(caller), eq(car))
        .times(1)
        .returning(|_, _| Ok(()));
    let state = StateBuilder::default()
        .auth(bearer_auth(TOKEN, caller))
        .cars(cars)
        .build();

    let (status, body) = call(
        state,
        authorised(
            test::TestRequest::post()
                .uri("/trpc/cars.addFavorite")
                .set_json(json!({"id": car.to_string()})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"]["message"], json!("Car added to favorites"));
}

#[actix_web::test]
async fn mutation_body_of_wrong_type_is_a_validation_error() {
    let state = StateBuilder::default().auth(bearer_auth(TOKEN, member())).build();
    let (status, body) = call(
        state,
        authorised(
            test::TestRequest::post()
                .uri("/trpc/cars.create")
                .set_json(json!({"year": "recent"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["data"]["issues"][0]["code"], json!("invalid_type"));
}

#[actix_web::test]
async fn forbidden_mutation_maps_to_forbidden_code() {
    let mut users = MockUserAccounts::new();
    users
        .expect_change_role()
        .returning(|_, _, _| Err(Error::forbidden("admin role required")));
    let state = StateBuilder::default()
        .auth(bearer_auth(TOKEN, member()))
        .users(users)
        .build();

    let (status, body) = call(
        state,
        authorised(
            test::TestRequest::post()
                .uri("/trpc/users.changeRole")
                .set_json(json!({"id": UserId::random().to_string(), "role": "admin"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], json!(-32003));
}

#[actix_web::test]
async fn login_sets_refresh_cookie() {
    let mut auth = MockAuthenticator::new();
    auth.expect_login().times(1).returning(|_| {
        Ok(AuthSession {
            user: user_with_role(Role::User),
            tokens: TokenPair {
                access_token: Zeroizing::new("access".to_owned()),
                expires_in: 900,
                refresh_token: Zeroizing::new("refresh".to_owned()),
                refresh_expires_in: 604_800,
            },
        })
    });
    let state = StateBuilder::default().auth(auth).build();
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(web::scope("/trpc").configure(configure)),
    )
    .await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/trpc/auth.login")
            .set_json(json!({"username": "ada", "password": "correct horse battery"}))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "refresh_token")
        .expect("refresh cookie");
    assert_eq!(cookie.value(), "refresh");
    assert_eq!(cookie.http_only(), Some(true));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["result"]["data"]["accessToken"], json!("access"));
}
