//! Manufacturer HTTP handlers.
//!
//! ```text
//! GET    /api/v1/manufacturers?search=volk&sort=name&order=asc
//! GET    /api/v1/manufacturers/{id}
//! POST   /api/v1/manufacturers          {"name":"Volkswagen"} (admin)
//! PATCH  /api/v1/manufacturers/{id}     {"slug":"vw"}         (admin)
//! DELETE /api/v1/manufacturers/{id}                           (admin)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::{
    CATALOG_NAME_MAX, CatalogName, Manufacturer, ManufacturerChanges, ManufacturerFilter,
    ManufacturerId, ManufacturerSort, ManufacturerSummary, NewManufacturer, Slug, SortOrder,
    normalize_search,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{created, done, ok};
use crate::inbound::http::principal::Authenticated;
use crate::inbound::http::query_schema::{
    QueryField, QueryParams, QuerySchema, document_query_params, pagination_fields,
};
use crate::inbound::http::schemas::{AckSchema, ErrorSchema, PageSchema, SuccessSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldIssues, ValidatedQuery, invalid_field, page_request, parse_id,
};

/// Manufacturer as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Volkswagen")]
    pub name: String,
    #[schema(example = "volkswagen")]
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Manufacturer> for ManufacturerResponse {
    fn from(value: Manufacturer) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.into(),
            slug: value.slug.into(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Manufacturer reference embedded in models and cars.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ManufacturerSummaryResponse {
    pub id: String,
    #[schema(example = "Volkswagen")]
    pub name: String,
    #[schema(example = "volkswagen")]
    pub slug: String,
}

impl From<ManufacturerSummary> for ManufacturerSummaryResponse {
    fn from(value: ManufacturerSummary) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.into(),
            slug: value.slug.into(),
        }
    }
}

/// Query parameters for `GET /api/v1/manufacturers`.
#[derive(Debug, Deserialize)]
pub struct ManufacturerListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub sort: String,
    pub order: String,
}

impl QueryParams for ManufacturerListQuery {
    fn fields() -> Vec<QueryField> {
        let mut fields = pagination_fields().to_vec();
        fields.extend([
            QueryField::new(
                "search",
                "Case-insensitive substring of the name.",
                QuerySchema::string().max_len(CATALOG_NAME_MAX).optional(),
            ),
            QueryField::new(
                "sort",
                "Sort key.",
                QuerySchema::one_of(ManufacturerSort::OPTIONS).with_default("name"),
            ),
            QueryField::new(
                "order",
                "Sort direction.",
                QuerySchema::one_of(SortOrder::OPTIONS).with_default("asc"),
            ),
        ]);
        fields
    }
}

document_query_params!(ManufacturerListQuery);

impl ManufacturerListQuery {
    /// Domain filter and page for this query.
    pub fn into_parts(self) -> ApiResult<(ManufacturerFilter, PageRequest)> {
        let mut fields = FieldIssues::default();
        let sort = fields.check("sort", self.sort.parse::<ManufacturerSort>());
        let order = fields.check("order", self.order.parse::<SortOrder>());
        let (sort, order) = fields.finish(sort.zip(order))?;
        let filter = ManufacturerFilter {
            search: normalize_search(self.search.as_deref()),
            sort,
            order,
        };
        Ok((filter, page_request(self.page, self.limit)?))
    }
}

/// Body for `POST /api/v1/manufacturers`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateManufacturerRequest {
    #[schema(example = "Volkswagen")]
    pub name: String,
    /// Derived from the name when omitted.
    #[schema(example = "volkswagen")]
    pub slug: Option<String>,
}

impl CreateManufacturerRequest {
    /// Validate into a domain value.
    pub fn into_new(self) -> ApiResult<NewManufacturer> {
        let mut fields = FieldIssues::default();
        let name = fields.check("name", CatalogName::new(&self.name));
        let slug = fields.check_optional("slug", self.slug.map(Slug::new));
        let (name, slug) = fields.finish(name.zip(slug))?;
        NewManufacturer::new(name, slug).map_err(|err| invalid_field("slug", &err))
    }
}

/// Body for `PATCH /api/v1/manufacturers/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateManufacturerRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl UpdateManufacturerRequest {
    /// Validate into a domain update.
    pub fn into_changes(self) -> ApiResult<ManufacturerChanges> {
        let mut fields = FieldIssues::default();
        let name = fields.check_optional("name", self.name.map(CatalogName::new));
        let slug = fields.check_optional("slug", self.slug.map(Slug::new));
        let (name, slug) = fields.finish(name.zip(slug))?;
        ManufacturerChanges::new(name, slug).map_err(|err| invalid_field("body", &err))
    }
}

/// Parse a manufacturer id path segment.
pub fn manufacturer_id(raw: &str) -> ApiResult<ManufacturerId> {
    parse_id("id", raw, ManufacturerId::new)
}

/// Page through manufacturers.
#[utoipa::path(
    get,
    path = "/api/v1/manufacturers",
    params(ManufacturerListQuery),
    responses(
        (status = 200, description = "Manufacturers", body = SuccessSchema<PageSchema<ManufacturerResponse>>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["manufacturers"],
    operation_id = "listManufacturers",
    security([])
)]
#[get("/manufacturers")]
pub async fn list_manufacturers(
    state: web::Data<HttpState>,
    query: ValidatedQuery<ManufacturerListQuery>,
) -> ApiResult<HttpResponse> {
    let (filter, page) = query.into_inner().into_parts()?;
    let manufacturers = state.manufacturers.list(filter, page).await?;
    Ok(ok(manufacturers.map(ManufacturerResponse::from)))
}

/// Fetch a manufacturer.
#[utoipa::path(
    get,
    path = "/api/v1/manufacturers/{id}",
    params(("id" = String, Path, description = "Manufacturer id")),
    responses(
        (status = 200, description = "Manufacturer", body = SuccessSchema<ManufacturerResponse>),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["manufacturers"],
    operation_id = "getManufacturer",
    security([])
)]
#[get("/manufacturers/{id}")]
pub async fn get_manufacturer(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = manufacturer_id(&path)?;
    let manufacturer = state.manufacturers.get(id).await?;
    Ok(ok(ManufacturerResponse::from(manufacturer)))
}

/// Create a manufacturer.
#[utoipa::path(
    post,
    path = "/api/v1/manufacturers",
    request_body = CreateManufacturerRequest,
    responses(
        (status = 201, description = "Created", body = SuccessSchema<ManufacturerResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Name or slug taken", body = ErrorSchema)
    ),
    tags = ["manufacturers"],
    operation_id = "createManufacturer",
    security(("bearer" = []), ("apiKey" = []))
)]
#[post("/manufacturers")]
pub async fn create_manufacturer(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<CreateManufacturerRequest>,
) -> ApiResult<HttpResponse> {
    let new = payload.into_inner().into_new()?;
    let manufacturer = state.manufacturers.create(auth.principal(), new).await?;
    Ok(created(ManufacturerResponse::from(manufacturer)))
}

/// Update a manufacturer.
#[utoipa::path(
    patch,
    path = "/api/v1/manufacturers/{id}",
    params(("id" = String, Path, description = "Manufacturer id")),
    request_body = UpdateManufacturerRequest,
    responses(
        (status = 200, description = "Updated", body = SuccessSchema<ManufacturerResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Name or slug taken", body = ErrorSchema)
    ),
    tags = ["manufacturers"],
    operation_id = "updateManufacturer",
    security(("bearer" = []), ("apiKey" = []))
)]
#[patch("/manufacturers/{id}")]
pub async fn update_manufacturer(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateManufacturerRequest>,
) -> ApiResult<HttpResponse> {
    let id = manufacturer_id(&path)?;
    let changes = payload.into_inner().into_changes()?;
    let manufacturer = state
        .manufacturers
        .update(auth.principal(), id, changes)
        .await?;
    Ok(ok(ManufacturerResponse::from(manufacturer)))
}

/// Delete a manufacturer with no models.
#[utoipa::path(
    delete,
    path = "/api/v1/manufacturers/{id}",
    params(("id" = String, Path, description = "Manufacturer id")),
    responses(
        (status = 200, description = "Deleted", body = AckSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Manufacturer still has models", body = ErrorSchema)
    ),
    tags = ["manufacturers"],
    operation_id = "deleteManufacturer",
    security(("bearer" = []), ("apiKey" = []))
)]
#[delete("/manufacturers/{id}")]
pub async fn delete_manufacturer(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = manufacturer_id(&path)?;
    state.manufacturers.delete(auth.principal(), id).await?;
    Ok(done("Manufacturer deleted"))
}

/// Register manufacturer routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_manufacturers)
        .service(get_manufacturer)
        .service(create_manufacturer)
        .service(update_manufacturer)
        .service(delete_manufacturer);
}

#[cfg(test)]
#[path = "manufacturers_tests.rs"]
mod tests;
