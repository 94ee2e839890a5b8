//! Integration tests for the Diesel repositories against PostgreSQL.
//!
//! Each test migrates and empties the database named by `TEST_DATABASE_URL`
//! and is skipped when the variable is unset.

use carmarket::domain::catalog::{
    CarFilter, CarModelId, CarSort, CatalogName, Color, Kilometres, ManufacturerFilter,
    ManufacturerId, ManufacturerSort, ModelYear, NewCar, NewCarModel, NewManufacturer, Price,
    SortOrder,
};
use carmarket::domain::ports::{
    CarModelRepository, CarRepository, ManufacturerRepository, NewUserRecord, RepositoryError,
    UserRepository,
};
use carmarket::domain::{PersonName, Role, User, UserFilter, Username};
use carmarket::outbound::persistence::{
    DbPool, DieselCarModelRepository, DieselCarRepository, DieselManufacturerRepository,
    DieselUserRepository,
};
use chrono::Utc;
use pagination::PageRequest;
use rstest::rstest;

mod support;

use support::fresh_database;

fn first_page() -> PageRequest {
    PageRequest::new(1, 20).expect("valid page")
}

fn name(raw: &str) -> CatalogName {
    CatalogName::new(raw).expect("valid name")
}

async fn seed_user(pool: &DbPool, username: &str, role: Role) -> User {
    DieselUserRepository::new(pool.clone())
        .insert(&NewUserRecord {
            role,
            first_name: PersonName::new("Ada").expect("valid name"),
            last_name: PersonName::new("Lovelace").expect("valid name"),
            username: Username::new(username).expect("valid username"),
            password_hash: "$argon2id$v=19$stub".to_owned(),
        })
        .await
        .expect("user inserts")
}

async fn seed_model(pool: &DbPool, manufacturer: &str, model: &str) -> CarModelId {
    let maker = DieselManufacturerRepository::new(pool.clone())
        .insert(&NewManufacturer::new(name(manufacturer), None).expect("valid manufacturer"))
        .await
        .expect("manufacturer inserts");
    DieselCarModelRepository::new(pool.clone())
        .insert(&NewCarModel::new(name(model), None, maker.id).expect("valid model"))
        .await
        .expect("model inserts")
        .id
}

fn new_car(model_id: CarModelId, price: i64) -> NewCar {
    NewCar {
        year: ModelYear::new(2019).expect("valid year"),
        color: Color::new("Blue").expect("valid colour"),
        km_driven: Kilometres::new(45_000).expect("valid reading"),
        price: Price::new(price).expect("valid price"),
        model_id,
    }
}

#[rstest]
#[actix_rt::test]
async fn manufacturer_names_are_unique_and_slugs_derived() {
    let Some(db) = fresh_database() else { return };
    let repo = DieselManufacturerRepository::new(db.pool().await);

    let created = repo
        .insert(&NewManufacturer::new(name("Alfa Romeo"), None).expect("valid"))
        .await
        .expect("first insert succeeds");
    assert_eq!(created.slug.as_ref(), "alfa-romeo");

    let err = repo
        .insert(&NewManufacturer::new(name("Alfa Romeo"), None).expect("valid"))
        .await
        .expect_err("duplicate name rejected");
    assert_eq!(
        err,
        RepositoryError::conflict("manufacturer name already exists")
    );
}

#[rstest]
#[actix_rt::test]
async fn manufacturer_listing_searches_and_sorts() {
    let Some(db) = fresh_database() else { return };
    let repo = DieselManufacturerRepository::new(db.pool().await);
    for maker in ["Volvo", "Audi", "Volkswagen"] {
        repo.insert(&NewManufacturer::new(name(maker), None).expect("valid"))
            .await
            .expect("insert succeeds");
    }

    let filter = ManufacturerFilter {
        search: Some("vo".to_owned()),
        sort: ManufacturerSort::Name,
        order: SortOrder::Desc,
    };
    let page = repo.list(&filter, first_page()).await.expect("list succeeds");

    let names: Vec<&str> = page.items().iter().map(|m| m.name.as_ref()).collect();
    assert_eq!(names, ["Volvo", "Volkswagen"]);
    assert_eq!(page.meta().total(), 2);
}

#[rstest]
#[actix_rt::test]
async fn models_reference_existing_manufacturers() {
    let Some(db) = fresh_database() else { return };
    let pool = db.pool().await;
    let models = DieselCarModelRepository::new(pool.clone());

    let err = models
        .insert(&NewCarModel::new(name("Golf"), None, ManufacturerId::random()).expect("valid"))
        .await
        .expect_err("unknown manufacturer rejected");
    assert_eq!(err, RepositoryError::missing_reference("manufacturer not found"));

    let model_id = seed_model(&pool, "Volkswagen", "Golf").await;
    let stored = models
        .find_by_id(model_id)
        .await
        .expect("lookup succeeds")
        .expect("model exists");
    assert_eq!(stored.manufacturer.slug.as_ref(), "volkswagen");
}

#[rstest]
#[actix_rt::test]
async fn manufacturers_with_models_cannot_be_deleted() {
    let Some(db) = fresh_database() else { return };
    let pool = db.pool().await;
    let model_id = seed_model(&pool, "Volkswagen", "Polo").await;
    let model = DieselCarModelRepository::new(pool.clone())
        .find_by_id(model_id)
        .await
        .expect("lookup succeeds")
        .expect("model exists");

    let err = DieselManufacturerRepository::new(pool)
        .delete(model.manufacturer.id)
        .await
        .expect_err("referenced manufacturer kept");
    assert_eq!(err, RepositoryError::conflict("manufacturer still has models"));
}

#[rstest]
#[actix_rt::test]
async fn car_listing_filters_and_hides_deleted_cars() {
    let Some(db) = fresh_database() else { return };
    let pool = db.pool().await;
    let owner = seed_user(&pool, "seller", Role::User).await;
    let model_id = seed_model(&pool, "Skoda", "Octavia").await;
    let cars = DieselCarRepository::new(pool);

    let cheap = cars
        .insert(&new_car(model_id, 9_500), owner.id)
        .await
        .expect("insert succeeds");
    let dear = cars
        .insert(&new_car(model_id, 21_000), owner.id)
        .await
        .expect("insert succeeds");
    assert_eq!(dear.model.manufacturer.name.as_ref(), "Skoda");

    let filter = CarFilter {
        price_max: Some(10_000),
        color: Some("blue".to_owned()),
        ..CarFilter::default()
    };
    let page = cars.list(&filter, first_page()).await.expect("list succeeds");
    assert_eq!(page.items().len(), 1);
    assert_eq!(page.items()[0].id, cheap.id);

    assert!(cars.soft_delete(cheap.id, Utc::now()).await.expect("delete succeeds"));
    assert!(!cars.soft_delete(cheap.id, Utc::now()).await.expect("second delete is a no-op"));
    assert!(cars.find_active(cheap.id).await.expect("lookup succeeds").is_none());

    let by_price = CarFilter {
        sort: CarSort::Price,
        order: SortOrder::Asc,
        ..CarFilter::default()
    };
    let remaining = cars.list(&by_price, first_page()).await.expect("list succeeds");
    assert_eq!(remaining.meta().total(), 1);
    assert_eq!(remaining.items()[0].id, dear.id);
}

#[rstest]
#[actix_rt::test]
async fn favourites_are_idempotent_and_skip_deleted_cars() {
    let Some(db) = fresh_database() else { return };
    let pool = db.pool().await;
    let owner = seed_user(&pool, "seller", Role::User).await;
    let fan = seed_user(&pool, "fan", Role::User).await;
    let model_id = seed_model(&pool, "Fiat", "Panda").await;
    let cars = DieselCarRepository::new(pool);
    let car = cars
        .insert(&new_car(model_id, 7_000), owner.id)
        .await
        .expect("insert succeeds");

    cars.add_favorite(fan.id, car.id).await.expect("favourite added");
    cars.add_favorite(fan.id, car.id).await.expect("repeat is a no-op");
    let favourites = cars
        .list_favorites(fan.id, first_page())
        .await
        .expect("list succeeds");
    assert_eq!(favourites.meta().total(), 1);

    cars.soft_delete(car.id, Utc::now()).await.expect("delete succeeds");
    let favourites = cars
        .list_favorites(fan.id, first_page())
        .await
        .expect("list succeeds");
    assert!(favourites.items().is_empty());

    cars.remove_favorite(fan.id, car.id).await.expect("removal succeeds");
}

#[rstest]
#[actix_rt::test]
async fn users_have_unique_usernames_and_soft_delete() {
    let Some(db) = fresh_database() else { return };
    let pool = db.pool().await;
    let users = DieselUserRepository::new(pool.clone());
    let ada = seed_user(&pool, "ada", Role::User).await;

    let duplicate = users
        .insert(&NewUserRecord {
            role: Role::User,
            first_name: PersonName::new("Ada").expect("valid"),
            last_name: PersonName::new("Byron").expect("valid"),
            username: Username::new("ADA").expect("valid"),
            password_hash: "x".to_owned(),
        })
        .await
        .expect_err("case-folded duplicate rejected");
    assert_eq!(duplicate, RepositoryError::conflict("username already taken"));

    let credentials = users
        .find_credentials("ada")
        .await
        .expect("lookup succeeds")
        .expect("credentials exist");
    assert_eq!(credentials.user.id, ada.id);

    let promoted = users
        .update_role(ada.id, Role::Admin)
        .await
        .expect("update succeeds")
        .expect("user exists");
    assert_eq!(promoted.role, Role::Admin);
    let admins = users
        .list(&UserFilter { role: Some(Role::Admin) }, first_page())
        .await
        .expect("list succeeds");
    assert_eq!(admins.meta().total(), 1);

    assert!(users.soft_delete(ada.id, Utc::now()).await.expect("delete succeeds"));
    assert!(users.find_active(ada.id).await.expect("lookup succeeds").is_none());
    assert!(users.find_credentials("ada").await.expect("lookup succeeds").is_none());
}

#[rstest]
#[actix_rt::test]
async fn api_keys_are_found_by_key_id() {
    let Some(db) = fresh_database() else { return };
    let pool = db.pool().await;
    let users = DieselUserRepository::new(pool.clone());
    let ada = seed_user(&pool, "ada", Role::User).await;

    assert!(
        users
            .store_api_key(ada.id, "key-1", "digest-1")
            .await
            .expect("store succeeds")
    );
    let stored = users
        .find_by_api_key("key-1")
        .await
        .expect("lookup succeeds")
        .expect("key exists");
    assert_eq!(stored.user.id, ada.id);
    assert_eq!(stored.secret_digest, "digest-1");
    assert!(users.find_by_api_key("key-2").await.expect("lookup succeeds").is_none());
}
