//! Car model HTTP handlers.
//!
//! ```text
//! GET    /api/v1/models?manufacturerId=…&search=golf
//! GET    /api/v1/models/{id}
//! POST   /api/v1/models        {"name":"Golf","manufacturerId":"…"} (admin)
//! PATCH  /api/v1/models/{id}   {"name":"Golf GTI"}                  (admin)
//! DELETE /api/v1/models/{id}                                        (admin)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::catalog::{
    CATALOG_NAME_MAX, CarModel, CarModelChanges, CarModelFilter, CarModelId, CatalogName,
    ManufacturerId, NewCarModel, Slug, normalize_search,
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

/// Model as returned to clients.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarModelResponse {
    pub id: String,
    #[schema(example = "Golf")]
    pub name: String,
    #[schema(example = "golf")]
    pub slug: String,
    pub manufacturer: ManufacturerSummaryResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CarModel> for CarModelResponse {
    fn from(value: CarModel) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.into(),
            slug: value.slug.into(),
            manufacturer: value.manufacturer.into(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters for `GET /api/v1/models`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarModelListQuery {
    pub page: u32,
    pub limit: u32,
    pub manufacturer_id: Option<String>,
    pub search: Option<String>,
}

impl QueryParams for CarModelListQuery {
    fn fields() -> Vec<QueryField> {
        let mut fields = pagination_fields().to_vec();
        fields.extend([
            QueryField::new(
                "manufacturerId",
                "Only models of this manufacturer.",
                QuerySchema::uuid().optional(),
            ),
            QueryField::new(
                "search",
                "Case-insensitive substring of the name.",
                QuerySchema::string().max_len(CATALOG_NAME_MAX).optional(),
            ),
        ]);
        fields
    }
}

document_query_params!(CarModelListQuery);

impl CarModelListQuery {
    /// Domain filter and page for this query.
    pub fn into_parts(self) -> ApiResult<(CarModelFilter, PageRequest)> {
        let manufacturer_id = self
            .manufacturer_id
            .as_deref()
            .map(|raw| parse_id("manufacturerId", raw, ManufacturerId::new))
            .transpose()?;
        let filter = CarModelFilter {
            manufacturer_id,
            search: normalize_search(self.search.as_deref()),
        };
        Ok((filter, page_request(self.page, self.limit)?))
    }
}

/// Body for `POST /api/v1/models`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarModelRequest {
    #[schema(example = "Golf")]
    pub name: String,
    /// Derived from the name when omitted.
    pub slug: Option<String>,
    pub manufacturer_id: String,
}

impl CreateCarModelRequest {
    /// Validate into a domain value.
    pub fn into_new(self) -> ApiResult<NewCarModel> {
        let mut fields = FieldIssues::default();
        let name = fields.check("name", CatalogName::new(&self.name));
        let slug = fields.check_optional("slug", self.slug.map(Slug::new));
        let manufacturer_id = fields.check(
            "manufacturerId",
            ManufacturerId::new(&self.manufacturer_id),
        );
        let ((name, slug), manufacturer_id) =
            fields.finish(name.zip(slug).zip(manufacturer_id))?;
        NewCarModel::new(name, slug, manufacturer_id).map_err(|err| invalid_field("slug", &err))
    }
}

/// Body for `PATCH /api/v1/models/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarModelRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    /// Move the model to another manufacturer.
    pub manufacturer_id: Option<String>,
}

impl UpdateCarModelRequest {
    /// Validate into a domain update.
    pub fn into_changes(self) -> ApiResult<CarModelChanges> {
        let mut fields = FieldIssues::default();
        let name = fields.check_optional("name", self.name.map(CatalogName::new));
        let slug = fields.check_optional("slug", self.slug.map(Slug::new));
        let manufacturer_id = fields.check_optional(
            "manufacturerId",
            self.manufacturer_id.map(ManufacturerId::new),
        );
        let ((name, slug), manufacturer_id) =
            fields.finish(name.zip(slug).zip(manufacturer_id))?;
        CarModelChanges::new(name, slug, manufacturer_id)
            .map_err(|err| invalid_field("body", &err))
    }
}

/// Parse a model id path segment.
pub fn model_id(raw: &str) -> ApiResult<CarModelId> {
    parse_id("id", raw, CarModelId::new)
}

/// Page through models, ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/models",
    params(CarModelListQuery),
    responses(
        (status = 200, description = "Models", body = SuccessSchema<PageSchema<CarModelResponse>>),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["models"],
    operation_id = "listModels",
    security([])
)]
#[get("/models")]
pub async fn list_models(
    state: web::Data<HttpState>,
    query: ValidatedQuery<CarModelListQuery>,
) -> ApiResult<HttpResponse> {
    let (filter, page) = query.into_inner().into_parts()?;
    let models = state.models.list(filter, page).await?;
    Ok(ok(models.map(CarModelResponse::from)))
}

/// Fetch a model with its manufacturer.
#[utoipa::path(
    get,
    path = "/api/v1/models/{id}",
    params(("id" = String, Path, description = "Model id")),
    responses(
        (status = 200, description = "Model", body = SuccessSchema<CarModelResponse>),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["models"],
    operation_id = "getModel",
    security([])
)]
#[get("/models/{id}")]
pub async fn get_model(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let model = state.models.get(model_id(&path)?).await?;
    Ok(ok(CarModelResponse::from(model)))
}

/// Create a model.
#[utoipa::path(
    post,
    path = "/api/v1/models",
    request_body = CreateCarModelRequest,
    responses(
        (status = 201, description = "Created", body = SuccessSchema<CarModelResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Manufacturer not found", body = ErrorSchema),
        (status = 409, description = "Name or slug taken", body = ErrorSchema)
    ),
    tags = ["models"],
    operation_id = "createModel",
    security(("bearer" = []), ("apiKey" = []))
)]
#[post("/models")]
pub async fn create_model(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<CreateCarModelRequest>,
) -> ApiResult<HttpResponse> {
    let new = payload.into_inner().into_new()?;
    let model = state.models.create(auth.principal(), new).await?;
    Ok(created(CarModelResponse::from(model)))
}

/// Update a model.
#[utoipa::path(
    patch,
    path = "/api/v1/models/{id}",
    params(("id" = String, Path, description = "Model id")),
    request_body = UpdateCarModelRequest,
    responses(
        (status = 200, description = "Updated", body = SuccessSchema<CarModelResponse>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Model or manufacturer not found", body = ErrorSchema),
        (status = 409, description = "Name or slug taken", body = ErrorSchema)
    ),
    tags = ["models"],
    operation_id = "updateModel",
    security(("bearer" = []), ("apiKey" = []))
)]
#[patch("/models/{id}")]
pub async fn update_model(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateCarModelRequest>,
) -> ApiResult<HttpResponse> {
    let id = model_id(&path)?;
    let changes = payload.into_inner().into_changes()?;
    let model = state.models.update(auth.principal(), id, changes).await?;
    Ok(ok(CarModelResponse::from(model)))
}

/// Delete a model no car refers to.
#[utoipa::path(
    delete,
    path = "/api/v1/models/{id}",
    params(("id" = String, Path, description = "Model id")),
    responses(
        (status = 200, description = "Deleted", body = AckSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Model still referenced by cars", body = ErrorSchema)
    ),
    tags = ["models"],
    operation_id = "deleteModel",
    security(("bearer" = []), ("apiKey" = []))
)]
#[delete("/models/{id}")]
pub async fn delete_model(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = model_id(&path)?;
    state.models.delete(auth.principal(), id).await?;
    Ok(done("Model deleted"))
}

/// Register model routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_models)
        .service(get_model)
        .service(create_model)
        .service(update_model)
        .service(delete_model);
}
