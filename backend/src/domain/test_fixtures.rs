//! Sample aggregates shared by domain and adapter unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::catalog::{
    Car, CarId, CarModel, CarModelId, CarModelSummary, CatalogName, Color, Kilometres,
    Manufacturer, ManufacturerId, ManufacturerSummary, ModelYear, Price, Slug,
};
use crate::domain::{PersonName, Principal, Role, User, UserId, Username};

pub(crate) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn manufacturer_summary() -> ManufacturerSummary {
    ManufacturerSummary {
        id: ManufacturerId::random(),
        name: CatalogName::new("Volkswagen").expect("valid name"),
        slug: Slug::new("volkswagen").expect("valid slug"),
    }
}

pub(crate) fn manufacturer() -> Manufacturer {
    let summary = manufacturer_summary();
    Manufacturer {
        id: summary.id,
        name: summary.name,
        slug: summary.slug,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub(crate) fn car_model() -> CarModel {
    CarModel {
        id: CarModelId::random(),
        name: CatalogName::new("Golf").expect("valid name"),
        slug: Slug::new("golf").expect("valid slug"),
        manufacturer: manufacturer_summary(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub(crate) fn car_owned_by(owner: UserId) -> Car {
    let model = car_model();
    Car {
        id: CarId::random(),
        year: ModelYear::from_stored(2019),
        color: Color::new("blue").expect("valid color"),
        km_driven: Kilometres::new(45_000).expect("valid km"),
        price: Price::new(18_500).expect("valid price"),
        model: CarModelSummary {
            id: model.id,
            name: model.name,
            slug: model.slug,
            manufacturer: model.manufacturer,
        },
        created_by: owner,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub(crate) fn user_with_role(role: Role) -> User {
    User {
        id: UserId::random(),
        role,
        first_name: PersonName::new("Ada").expect("valid name"),
        last_name: PersonName::new("Lovelace").expect("valid name"),
        username: Username::new("ada").expect("valid username"),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

pub(crate) fn admin() -> Principal {
    Principal::new(UserId::random(), Role::Admin)
}

pub(crate) fn member() -> Principal {
    Principal::new(UserId::random(), Role::User)
}
