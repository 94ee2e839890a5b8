//! Procedure table: maps a dotted procedure path onto a driving port call.

use actix_web::cookie::Cookie;
use actix_web::http::header::HeaderMap;
use pagination::{Cursor, PageRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::{
    Error, IssueCode, LoginCredentials, Principal, Registration, ValidationIssue,
};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest, session_response};
use crate::inbound::http::car_models::{
    CarModelListQuery, CarModelResponse, CreateCarModelRequest, UpdateCarModelRequest, model_id,
};
use crate::inbound::http::cars::{
    CarFilterQuery, CarListQuery, CarResponse, CreateCarRequest, FavoritesQuery,
    UpdateCarRequest, car_id,
};
use crate::inbound::http::manufacturers::{
    CreateManufacturerRequest, ManufacturerListQuery, ManufacturerResponse,
    UpdateManufacturerRequest, manufacturer_id,
};
use crate::inbound::http::principal::{
    PresentedCredential, presented_credential, verify_credential,
};
use crate::inbound::http::query_schema::{
    QueryField, QueryParams, QuerySchema, pagination_fields,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{
    ApiKeyResponse, ChangeRoleRequest, UpdateProfileRequest, UserListQuery, UserResponse,
    parse_role, user_id,
};
use crate::inbound::http::validation::{page_request, parse_params};

/// Procedures served over GET.
pub const QUERIES: &[&str] = &[
    "manufacturers.list",
    "manufacturers.byId",
    "models.list",
    "models.byId",
    "cars.list",
    "cars.byId",
    "cars.infinite",
    "cars.favorites",
    "users.list",
    "users.me",
    "users.byId",
];

/// Procedures served over POST.
pub const MUTATIONS: &[&str] = &[
    "manufacturers.create",
    "manufacturers.update",
    "manufacturers.delete",
    "models.create",
    "models.update",
    "models.delete",
    "cars.create",
    "cars.update",
    "cars.delete",
    "cars.addFavorite",
    "cars.removeFavorite",
    "users.updateProfile",
    "users.changeRole",
    "users.delete",
    "users.issueApiKey",
    "auth.register",
    "auth.login",
];

/// Whether a procedure is read-only or state-changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Query,
    Mutation,
}

impl Kind {
    /// Kind of the procedure at `path`, or `None` when no such procedure exists.
    pub fn of(path: &str) -> Option<Self> {
        if QUERIES.contains(&path) {
            Some(Self::Query)
        } else if MUTATIONS.contains(&path) {
            Some(Self::Mutation)
        } else {
            None
        }
    }

    /// HTTP method the procedure must be called with.
    pub const fn method(self) -> &'static str {
        match self {
            Self::Query => "GET",
            Self::Mutation => "POST",
        }
    }
}

/// Procedure output plus an optional cookie to set.
#[derive(Debug)]
pub struct Reply {
    pub data: Value,
    pub cookie: Option<Cookie<'static>>,
}

impl Reply {
    fn data(value: impl Serialize) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(|data| Self { data, cookie: None })
            .map_err(|err| Error::internal(format!("failed to encode procedure output: {err}")))
    }

    fn ack(message: &str) -> Result<Self, Error> {
        Self::data(json!({ "message": message }))
    }
}

/// Credential carried by the request, resolved only when a procedure needs it.
#[derive(Debug, Clone)]
pub struct Caller {
    credential: Result<Option<PresentedCredential>, Error>,
}

impl Caller {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            credential: presented_credential(headers),
        }
    }

    async fn principal(&self, state: &HttpState) -> Result<Principal, Error> {
        let credential = self
            .credential
            .clone()?
            .ok_or_else(|| Error::unauthorized("authentication required"))?;
        verify_credential(state.auth.as_ref(), credential).await
    }
}

#[derive(Debug, Deserialize)]
struct ByIdInput {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WithId<T> {
    id: String,
    #[serde(flatten)]
    changes: T,
}

/// Input of `cars.infinite`: a page size, an opaque cursor, and the filters
/// of `cars.list`.
#[derive(Debug, Deserialize)]
struct InfiniteCarsInput {
    limit: u32,
    cursor: Option<String>,
    #[serde(flatten)]
    filter: CarFilterQuery,
}

impl QueryParams for InfiniteCarsInput {
    fn fields() -> Vec<QueryField> {
        let [_, limit] = pagination_fields();
        let mut fields = vec![
            limit,
            QueryField::new(
                "cursor",
                "Cursor returned as `nextCursor` by the previous call.",
                QuerySchema::string().min_len(1).optional().nullable(),
            ),
        ];
        fields.extend(CarFilterQuery::fields());
        fields
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InfiniteCars {
    items: Vec<CarResponse>,
    next_cursor: Option<String>,
}

fn object(input: Value) -> Result<Map<String, Value>, Error> {
    match input {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(Error::validation([ValidationIssue::new(
            IssueCode::InvalidType,
            "Expected object",
        )
        .with_received(other)])),
    }
}

fn params<T: QueryParams>(input: Value) -> Result<T, Error> {
    parse_params(&object(input)?)
}

fn body<T: DeserializeOwned>(input: Value) -> Result<T, Error> {
    serde_json::from_value(Value::Object(object(input)?)).map_err(|err| {
        Error::validation([ValidationIssue::new(IssueCode::InvalidType, err.to_string())])
    })
}

fn by_id(input: Value) -> Result<String, Error> {
    body::<ByIdInput>(input).map(|input| input.id)
}

fn cursor_page(raw: Option<&str>, limit: u32) -> Result<PageRequest, Error> {
    match raw {
        None => page_request(1, limit),
        Some(raw) => Cursor::decode(raw).map(|cursor| cursor.request()).map_err(|err| {
            Error::validation([
                ValidationIssue::new(IssueCode::Custom, err.to_string()).at("cursor")
            ])
        }),
    }
}

/// Run query `path`.
pub async fn query(
    state: &HttpState,
    caller: &Caller,
    path: &str,
    input: Value,
) -> Result<Reply, Error> {
    match path {
        "manufacturers.list" => {
            let (filter, page) = params::<ManufacturerListQuery>(input)?.into_parts()?;
            let found = state.manufacturers.list(filter, page).await?;
            Reply::data(found.map(ManufacturerResponse::from))
        }
        "manufacturers.byId" => {
            let id = manufacturer_id(&by_id(input)?)?;
            Reply::data(ManufacturerResponse::from(state.manufacturers.get(id).await?))
        }
        "models.list" => {
            let (filter, page) = params::<CarModelListQuery>(input)?.into_parts()?;
            let found = state.models.list(filter, page).await?;
            Reply::data(found.map(CarModelResponse::from))
        }
        "models.byId" => {
            let id = model_id(&by_id(input)?)?;
            Reply::data(CarModelResponse::from(state.models.get(id).await?))
        }
        "cars.list" => {
            let (filter, page) = params::<CarListQuery>(input)?.into_parts()?;
            let found = state.cars.list(filter, page).await?;
            Reply::data(found.map(CarResponse::from))
        }
        "cars.byId" => {
            let id = car_id(&by_id(input)?)?;
            Reply::data(CarResponse::from(state.cars.get(id).await?))
        }
        "cars.infinite" => {
            let input = params::<InfiniteCarsInput>(input)?;
            let page = cursor_page(input.cursor.as_deref(), input.limit)?;
            let filter = input.filter.into_filter()?;
            let found = state.cars.list(filter, page).await?;
            let next_cursor = found.next_cursor().map(|cursor| cursor.encode());
            Reply::data(InfiniteCars {
                items: found.into_items().into_iter().map(CarResponse::from).collect(),
                next_cursor,
            })
        }
        "cars.favorites" => {
            let principal = caller.principal(state).await?;
            let query = params::<FavoritesQuery>(input)?;
            let page = page_request(query.page, query.limit)?;
            let found = state.cars.favorites(&principal, page).await?;
            Reply::data(found.map(CarResponse::from))
        }
        "users.list" => {
            let principal = caller.principal(state).await?;
            let (filter, page) = params::<UserListQuery>(input)?.into_parts()?;
            let found = state.users.list(&principal, filter, page).await?;
            Reply::data(found.map(UserResponse::from))
        }
        "users.me" => {
            let principal = caller.principal(state).await?;
            Reply::data(UserResponse::from(state.users.me(&principal).await?))
        }
        "users.byId" => {
            let principal = caller.principal(state).await?;
            let id = user_id(&by_id(input)?)?;
            Reply::data(UserResponse::from(state.users.get(&principal, id).await?))
        }
        other => Err(Error::not_found(format!("no query named '{other}'"))),
    }
}

/// Run mutation `path`.
pub async fn mutation(
    state: &HttpState,
    caller: &Caller,
    path: &str,
    input: Value,
) -> Result<Reply, Error> {
    match path {
        "auth.register" => {
            let registration = Registration::try_from(body::<RegisterRequest>(input)?)?;
            Reply::data(UserResponse::from(state.auth.register(registration).await?))
        }
        "auth.login" => {
            let credentials = LoginCredentials::try_from(body::<LoginRequest>(input)?)?;
            let session = state.auth.login(credentials).await?;
            let (response, cookie) = session_response(session, &state.refresh_cookie);
            let mut reply = Reply::data(response)?;
            reply.cookie = Some(cookie);
            Ok(reply)
        }
        _ => {
            let principal = caller.principal(state).await?;
            authenticated_mutation(state, &principal, path, input).await
        }
    }
}

async fn authenticated_mutation(
    state: &HttpState,
    principal: &Principal,
    path: &str,
    input: Value,
) -> Result<Reply, Error> {
    match path {
        "manufacturers.create" => {
            let new = body::<CreateManufacturerRequest>(input)?.into_new()?;
            let created = state.manufacturers.create(principal, new).await?;
            Reply::data(ManufacturerResponse::from(created))
        }
        "manufacturers.update" => {
            let input = body::<WithId<UpdateManufacturerRequest>>(input)?;
            let id = manufacturer_id(&input.id)?;
            let changes = input.changes.into_changes()?;
            let updated = state.manufacturers.update(principal, id, changes).await?;
            Reply::data(ManufacturerResponse::from(updated))
        }
        "manufacturers.delete" => {
            let id = manufacturer_id(&by_id(input)?)?;
            state.manufacturers.delete(principal, id).await?;
            Reply::ack("Manufacturer deleted")
        }
        "models.create" => {
            let new = body::<CreateCarModelRequest>(input)?.into_new()?;
            Reply::data(CarModelResponse::from(state.models.create(principal, new).await?))
        }
        "models.update" => {
            let input = body::<WithId<UpdateCarModelRequest>>(input)?;
            let id = model_id(&input.id)?;
            let changes = input.changes.into_changes()?;
            let updated = state.models.update(principal, id, changes).await?;
            Reply::data(CarModelResponse::from(updated))
        }
        "models.delete" => {
            let id = model_id(&by_id(input)?)?;
            state.models.delete(principal, id).await?;
            Reply::ack("Model deleted")
        }
        "cars.create" => {
            let new = body::<CreateCarRequest>(input)?.into_new()?;
            Reply::data(CarResponse::from(state.cars.create(principal, new).await?))
        }
        "cars.update" => {
            let input = body::<WithId<UpdateCarRequest>>(input)?;
            let id = car_id(&input.id)?;
            let changes = input.changes.into_changes()?;
            Reply::data(CarResponse::from(state.cars.update(principal, id, changes).await?))
        }
        "cars.delete" => {
            let id = car_id(&by_id(input)?)?;
            state.cars.delete(principal, id).await?;
            Reply::ack("Car deleted")
        }
        "cars.addFavorite" => {
            let id = car_id(&by_id(input)?)?;
            state.cars.add_favorite(principal, id).await?;
            Reply::ack("Car added to favorites")
        }
        "cars.removeFavorite" => {
            let id = car_id(&by_id(input)?)?;
            state.cars.remove_favorite(principal, id).await?;
            Reply::ack("Car removed from favorites")
        }
        "users.updateProfile" => {
            let update = body::<UpdateProfileRequest>(input)?.into_update()?;
            let updated = state.users.update_profile(principal, update).await?;
            Reply::data(UserResponse::from(updated))
        }
        "users.changeRole" => {
            let input = body::<WithId<ChangeRoleRequest>>(input)?;
            let id = user_id(&input.id)?;
            let role = parse_role("role", &input.changes.role)?;
            let updated = state.users.change_role(principal, id, role).await?;
            Reply::data(UserResponse::from(updated))
        }
        "users.delete" => {
            let id = user_id(&by_id(input)?)?;
            state.users.delete(principal, id).await?;
            Reply::ack("User deleted")
        }
        "users.issueApiKey" => {
            let issued = state.users.issue_api_key(principal).await?;
            Reply::data(ApiKeyResponse::from(issued))
        }
        other => Err(Error::not_found(format!("no mutation named '{other}'"))),
    }
}
