//! Car listing and favourite HTTP handlers.
//!
//! ```text
//! GET    /api/v1/cars?manufacturerId=…&yearFrom=2015&priceMax=20000&sort=price
//! GET    /api/v1/cars/favorites
//! GET    /api/v1/cars/{id}
//! POST   /api/v1/cars                 {"year":2019,"color":"blue",…}
//! PATCH  /api/v1/cars/{id}            {"price":17500}  (owner or admin)
//! DELETE /api/v1/cars/{id}                             (owner or admin)
//! POST   /api/v1/cars/{id}/favorite
//! DELETE /api/v1/cars/{id}/favorite
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::{
    COLOR_MAX, Car, CarChanges, CarFilter, CarId, CarModelId, CarModelSummary, CarSort,
    CatalogValidationError, Color, Kilometres, MIN_MODEL_YEAR, ManufacturerId, ModelYear, NewCar,
    PRICE_MAX, Price, SortOrder,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, done, ok};
use crate::inbound::http::manufacturers::ManufacturerSummaryResponse;
use crate::inbound::http::principal::Authenticated;
use crate::inbound::http::query_schema::{
    QueryField, QueryParams, QuerySchema, document_query_params, pagination_fields,
};
use crate::inbound::http::schemas::{AckSchema, ErrorSchema, PageSchema, SuccessSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldIssues, ValidatedQuery, invalid_field, page_request, parse_id,
};

/// Model reference embedded in a car.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CarModelSummaryResponse {
    pub id: String,
    #[schema(example = "Golf")]
    pub name: String,
    #[schema(example = "golf")]
    pub slug: String,
    pub manufacturer: ManufacturerSummaryResponse,
}

impl From<CarModelSummary> for CarModelSummaryResponse {
    fn from(value: CarModelSummary) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.into(),
            slug: value.slug.into(),
            manufacturer: value.manufacturer.into(),
        }
    }
}

/// Car listing as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
    pub id: String,
    #[schema(example = 2019)]
    pub year: i32,
    #[schema(example = "blue")]
    pub color: String,
    #[schema(example = 45000)]
    pub km_driven: i32,
    #[schema(example = 18500)]
    pub price: i64,
    pub model: CarModelSummaryResponse,
    /// Id of the listing's owner.
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Car> for CarResponse {
    fn from(value: Car) -> Self {
        Self {
            id: value.id.to_string(),
            year: value.year.get(),
            color: value.color.to_string(),
            km_driven: value.km_driven.get(),
            price: value.price.get(),
            model: value.model.into(),
            created_by: value.created_by.to_string(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Filter and sort parameters shared by the paged and cursor listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarFilterQuery {
    pub manufacturer_id: Option<String>,
    pub model_id: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub color: Option<String>,
    pub sort: String,
    pub order: String,
}

impl CarFilterQuery {
    /// Declared filter parameters.
    #[must_use]
    pub fn fields() -> Vec<QueryField> {
        let year = || {
            QuerySchema::integer()
                .min(i64::from(MIN_MODEL_YEAR))
                .max(9999)
                .optional()
        };
        let price = || QuerySchema::integer().min(0).max(PRICE_MAX).optional();
        vec![
            QueryField::new(
                "manufacturerId",
                "Only cars of this manufacturer.",
                QuerySchema::uuid().optional(),
            ),
            QueryField::new(
                "modelId",
                "Only cars of this model.",
                QuerySchema::uuid().optional(),
            ),
            QueryField::new("yearFrom", "Earliest model year, inclusive.", year()),
            QueryField::new("yearTo", "Latest model year, inclusive.", year()),
            QueryField::new("priceMin", "Lowest price, inclusive.", price()),
            QueryField::new("priceMax", "Highest price, inclusive.", price()),
            QueryField::new(
                "color",
                "Exact colour, case-insensitive.",
                QuerySchema::string().min_len(1).max_len(COLOR_MAX).optional(),
            ),
            QueryField::new(
                "sort",
                "Sort key.",
                QuerySchema::one_of(CarSort::OPTIONS).with_default("createdAt"),
            ),
            QueryField::new(
                "order",
                "Sort direction.",
                QuerySchema::one_of(SortOrder::OPTIONS).with_default("desc"),
            ),
        ]
    }

    /// Domain filter for these parameters.
    pub fn into_filter(self) -> ApiResult<CarFilter> {
        let mut fields = FieldIssues::default();
        let manufacturer_id = fields.check_optional(
            "manufacturerId",
            self.manufacturer_id.as_deref().map(ManufacturerId::new),
        );
        let model_id =
            fields.check_optional("modelId", self.model_id.as_deref().map(CarModelId::new));
        let sort = fields.check("sort", self.sort.parse::<CarSort>());
        let order = fields.check("order", self.order.parse::<SortOrder>());
        let (((manufacturer_id, model_id), sort), order) =
            fields.finish(manufacturer_id.zip(model_id).zip(sort).zip(order))?;

        CarFilter {
            manufacturer_id,
            model_id,
            year_from: self.year_from,
            year_to: self.year_to,
            price_min: self.price_min,
            price_max: self.price_max,
            color: self
                .color
                .map(|color| color.trim().to_owned())
                .filter(|color| !color.is_empty()),
            sort,
            order,
        }
        .validate()
        .map_err(|err| {
            let field = match &err {
                CatalogValidationError::InvertedRange { from, .. } => *from,
                _ => "query",
            };
            invalid_field(field, &err)
        })
    }
}

/// Query parameters for `GET /api/v1/cars`.
#[derive(Debug, Deserialize)]
pub struct CarListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(flatten)]
    pub filter: CarFilterQuery,
}

impl QueryParams for CarListQuery {
    fn fields() -> Vec<QueryField> {
        let mut fields = pagination_fields().to_vec();
        fields.extend(CarFilterQuery::fields());
        fields
    }
}

/// Query parameters for `GET /api/v1/cars/favorites`.
#[derive(Debug, Deserialize)]
pub struct FavoritesQuery {
    pub page: u32,
    pub limit: u32,
}

impl QueryParams for FavoritesQuery {
    fn fields() -> Vec<QueryField> {
        pagination_fields().to_vec()
    }
}

document_query_params!(CarListQuery, FavoritesQuery);

impl CarListQuery {
    /// Domain filter and page for this query.
    pub fn into_parts(self) -> ApiResult<(CarFilter, PageRequest)> {
        let page = page_request(self.page, self.limit)?;
        Ok((self.filter.into_filter()?, page))
    }
}

/// Body for `POST /api/v1/cars`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    #[schema(example = 2019)]
    pub year: i32,
    #[schema(example = "blue")]
    pub color: String,
    #[schema(example = 45000)]
    pub km_driven: i32,
    #[schema(example = 18500)]
    pub price: i64,
    pub model_id: String,
}

impl CreateCarRequest {
    /// Validate into a domain value.
    pub fn into_new(self) -> ApiResult<NewCar> {
        let mut fields = FieldIssues::default();
        let year = fields.check("year", ModelYear::new(self.year));
        let color = fields.check("color", Color::new(&self.color));
        let km_driven = fields.check("kmDriven", Kilometres::new(self.km_driven));
        let price = fields.check("price", Price::new(self.price));
        let model_id = fields.check("modelId", CarModelId::new(&self.model_id));
        let ((((year, color), km_driven), price), model_id) =
            fields.finish(year.zip(color).zip(km_driven).zip(price).zip(model_id))?;
        Ok(NewCar {
            year,
            color,
            km_driven,
            price,
            model_id,
        })
    }
}

/// Body for `PATCH /api/v1/cars/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarRequest {
    pub year: Option<i32>,
    pub color: Option<String>,
    pub km_driven: Option<i32>,
    pub price: Option<i64>,
    pub model_id: Option<String>,
}

impl UpdateCarRequest {
    /// Validate into a domain update.
    pub fn into_changes(self) -> ApiResult<CarChanges> {
        let mut fields = FieldIssues::default();
        let year = fields.check_optional("year", self.year.map(ModelYear::new));
        let color = fields.check_optional("color", self.color.map(Color::new));
        let km_driven = fields.check_optional("kmDriven", self.km_driven.map(Kilometres::new));
        let price = fields.check_optional("price", self.price.map(Price::new));
        let model_id = fields.check_optional("modelId", self.model_id.map(CarModelId::new));
        let ((((year, color), km_driven), price), model_id) =
            fields.finish(year.zip(color).zip(km_driven).zip(price).zip(model_id))?;
        CarChanges {
            year,
            color,
            km_driven,
            price,
            model_id,
        }
        .ensure_not_empty()
        .map_err(|err| invalid_field("body", &err))
    }
}

/// Parse a car id path segment.
pub fn car_id(raw: &str) -> ApiResult<CarId> {
    parse_id("id", raw, CarId::new)
}

/// Page through active cars.
#[utoipa::path(
    get,
    path = "/api/v1/cars",
    params(CarListQuery),
    responses(
        (status = 200, description = "Cars", body = SuccessSchema<PageSchema<CarResponse>>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "listCars",
    security([])
)]
#[get("/cars")]
pub async fn list_cars(
    state: web::Data<HttpState>,
    query: ValidatedQuery<CarListQuery>,
) -> ApiResult<HttpResponse> {
    let (filter, page) = query.into_inner().into_parts()?;
    let cars = state.cars.list(filter, page).await?;
    Ok(ok(cars.map(CarResponse::from)))
}

/// Page through the caller's favourites, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/cars/favorites",
    params(FavoritesQuery),
    responses(
        (status = 200, description = "Favourite cars", body = SuccessSchema<PageSchema<CarResponse>>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "listFavoriteCars",
    security(("bearer" = []), ("apiKey" = []))
)]
#[get("/cars/favorites")]
pub async fn list_favorites(
    state: web::Data<HttpState>,
    auth: Authenticated,
    query: ValidatedQuery<FavoritesQuery>,
) -> ApiResult<HttpResponse> {
    let page = page_request(query.page, query.limit)?;
    let cars = state.cars.favorites(auth.principal(), page).await?;
    Ok(ok(cars.map(CarResponse::from)))
}

/// Fetch an active car.
#[utoipa::path(
    get,
    path = "/api/v1/cars/{id}",
    params(("id" = String, Path, description = "Car id")),
    responses(
        (status = 200, description = "Car", body = SuccessSchema<CarResponse>),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "getCar",
    security([])
)]
#[get("/cars/{id}")]
pub async fn get_car(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let car = state.cars.get(car_id(&path)?).await?;
    Ok(ok(CarResponse::from(car)))
}

/// List a car for sale, owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/cars",
    request_body = CreateCarRequest,
    responses(
        (status = 201, description = "Created", body = SuccessSchema<CarResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Model not found", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "createCar",
    security(("bearer" = []), ("apiKey" = []))
)]
#[post("/cars")]
pub async fn create_car(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<CreateCarRequest>,
) -> ApiResult<HttpResponse> {
    let new = payload.into_inner().into_new()?;
    let car = state.cars.create(auth.principal(), new).await?;
    Ok(created(CarResponse::from(car)))
}

/// Update a car listing.
#[utoipa::path(
    patch,
    path = "/api/v1/cars/{id}",
    params(("id" = String, Path, description = "Car id")),
    request_body = UpdateCarRequest,
    responses(
        (status = 200, description = "Updated", body = SuccessSchema<CarResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Car or model not found", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "updateCar",
    security(("bearer" = []), ("apiKey" = []))
)]
#[patch("/cars/{id}")]
pub async fn update_car(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateCarRequest>,
) -> ApiResult<HttpResponse> {
    let id = car_id(&path)?;
    let changes = payload.into_inner().into_changes()?;
    let car = state.cars.update(auth.principal(), id, changes).await?;
    Ok(ok(CarResponse::from(car)))
}

/// Soft-delete a car listing.
#[utoipa::path(
    delete,
    path = "/api/v1/cars/{id}",
    params(("id" = String, Path, description = "Car id")),
    responses(
        (status = 200, description = "Deleted", body = AckSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "deleteCar",
    security(("bearer" = []), ("apiKey" = []))
)]
#[delete("/cars/{id}")]
pub async fn delete_car(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = car_id(&path)?;
    state.cars.delete(auth.principal(), id).await?;
    Ok(done("Car deleted"))
}

/// Add a car to the caller's favourites.
#[utoipa::path(
    post,
    path = "/api/v1/cars/{id}/favorite",
    params(("id" = String, Path, description = "Car id")),
    responses(
        (status = 200, description = "Favourited", body = AckSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "addFavoriteCar",
    security(("bearer" = []), ("apiKey" = []))
)]
#[post("/cars/{id}/favorite")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = car_id(&path)?;
    state.cars.add_favorite(auth.principal(), id).await?;
    Ok(done("Car added to favorites"))
}

/// Remove a car from the caller's favourites.
#[utoipa::path(
    delete,
    path = "/api/v1/cars/{id}/favorite",
    params(("id" = String, Path, description = "Car id")),
    responses(
        (status = 200, description = "Unfavourited", body = AckSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "removeFavoriteCar",
    security(("bearer" = []), ("apiKey" = []))
)]
#[delete("/cars/{id}/favorite")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = car_id(&path)?;
    state.cars.remove_favorite(auth.principal(), id).await?;
    Ok(done("Car removed from favorites"))
}

/// Register car routes. `/cars/favorites` precedes `/cars/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_cars)
        .service(list_favorites)
        .service(get_car)
        .service(create_car)
        .service(update_car)
        .service(delete_car)
        .service(add_favorite)
        .service(remove_favorite);
}

#[cfg(test)]
#[path = "cars_tests.rs"]
mod tests;
